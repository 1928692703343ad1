// Sequential summary generation over a list of videos

use log::{info, warn};
use tokio::time::{sleep, Duration};

use super::generator::{QualityPreference, SummaryGenerator, SummaryResult, TextModel};
use crate::resolver::models::VideoRecord;

/// Delay between items, keeping the run under an assumed upstream limit
/// of ~3 requests/minute.
const INTER_ITEM_DELAY: Duration = Duration::from_millis(20_100);

/// One video plus the bookkeeping the driver maintains for it.
///
/// `loading` is true for at most one item at a time: the driver settles
/// each item completely before starting the next.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub video: VideoRecord,
    pub summary: Option<SummaryResult>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BatchItem {
    pub fn new(video: VideoRecord) -> Self {
        Self {
            video,
            summary: None,
            loading: false,
            error: None,
        }
    }
}

/// Wrap resolved videos for a batch run.
pub fn batch_items(videos: Vec<VideoRecord>) -> Vec<BatchItem> {
    videos.into_iter().map(BatchItem::new).collect()
}

/// Generate summaries for every item, strictly in list order.
///
/// A failing item records its error and the run continues; one bad video
/// does not stop the batch. Re-invoking on the same list reprocesses
/// every item unconditionally.
pub async fn run_all<M: TextModel>(
    generator: &SummaryGenerator<M>,
    items: &mut [BatchItem],
    quality: QualityPreference,
) {
    let total = items.len();
    for index in 0..total {
        items[index].loading = true;
        items[index].error = None;

        let outcome = generator
            .generate_summary(&items[index].video, quality)
            .await;

        let item = &mut items[index];
        match outcome {
            Ok(text) => {
                info!("summary {}/{} generated for {}", index + 1, total, item.video.id);
                item.summary = Some(SummaryResult::new(text));
            }
            Err(e) => {
                warn!(
                    "summary {}/{} failed for \"{}\": {}",
                    index + 1,
                    total,
                    item.video.snippet.title,
                    e
                );
                item.error = Some(format!("Failed: {}", e));
            }
        }
        item.loading = false;

        if index + 1 < total {
            sleep(INTER_ITEM_DELAY).await;
        }
    }
}
