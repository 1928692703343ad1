// Local command-string generation for yt-dlp and ffmpeg

use lazy_static::lazy_static;
use regex::Regex;

/// Quality ceiling for a generated yt-dlp command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityCeiling {
    #[default]
    Best,
    P2160,
    P1440,
    P1080,
    P720,
}

impl QualityCeiling {
    pub const ALL: [QualityCeiling; 5] = [
        QualityCeiling::Best,
        QualityCeiling::P2160,
        QualityCeiling::P1440,
        QualityCeiling::P1080,
        QualityCeiling::P720,
    ];

    /// Height cap in pixels; `None` means no cap.
    pub fn height(self) -> Option<u32> {
        match self {
            Self::Best => None,
            Self::P2160 => Some(2160),
            Self::P1440 => Some(1440),
            Self::P1080 => Some(1080),
            Self::P720 => Some(720),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Best => "Best",
            Self::P2160 => "4K (2160p)",
            Self::P1440 => "1440p",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
        }
    }
}

/// Output container for merged downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    #[default]
    Mp4,
    Mkv,
    Webm,
    Avi,
}

impl Container {
    pub const ALL: [Container; 4] = [
        Container::Mp4,
        Container::Mkv,
        Container::Webm,
        Container::Avi,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mkv => "mkv",
            Self::Webm => "webm",
            Self::Avi => "avi",
        }
    }
}

/// Options for one generated yt-dlp invocation.
#[derive(Debug, Clone, Default)]
pub struct DownloadCommand {
    pub url: String,
    pub filename: Option<String>,
    pub audio_only: bool,
    pub quality: QualityCeiling,
    pub container: Container,
}

impl DownloadCommand {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub fn with_audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }

    pub fn with_quality(mut self, quality: QualityCeiling) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = container;
        self
    }

    /// Assemble the yt-dlp command string, or `None` for a blank URL.
    pub fn build(&self) -> Option<String> {
        let url = self.url.trim();
        if url.is_empty() {
            return None;
        }

        let mut command = String::from("yt-dlp");

        if self.audio_only {
            command.push_str(" -f bestaudio -x --audio-format mp3");
        } else {
            let selector = match self.quality.height() {
                None => "bv*+ba/b".to_string(),
                Some(height) => format!("bv*[height<={}]+ba/b[height<={}]", height, height),
            };
            command.push_str(&format!(
                " -f \"{}\" --merge-output-format {}",
                selector,
                self.container.extension()
            ));
        }

        match self.filename.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) => {
                // Complete the extension when the caller left it off.
                let full_name = if name.contains('.') {
                    name.to_string()
                } else if self.audio_only {
                    format!("{}.mp3", name)
                } else {
                    format!("{}.{}", name, self.container.extension())
                };
                command.push_str(&format!(" -o \"{}\"", full_name));
            }
            None => command.push_str(" -o \"%(title)s.%(ext)s\""),
        }

        command.push_str(&format!(" \"{}\"", url));
        Some(command)
    }
}

/// Replace characters that are invalid in file names with underscores.
pub fn sanitize_filename(name: &str) -> String {
    lazy_static! {
        static ref INVALID: Regex = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
    }
    INVALID.replace_all(name, "_").into_owned()
}

/// Remux command for a single stream link.
pub fn ffmpeg_command(link: &str, title: &str) -> String {
    format!(
        "ffmpeg -i \"{}\" -c copy \"{}.mp4\"",
        link,
        sanitize_filename(title)
    )
}

/// One remux command per link, suffixed with an index to avoid filename
/// collisions.
pub fn ffmpeg_commands(title: &str, links: &[String]) -> String {
    let sanitized = sanitize_filename(title);
    links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            format!(
                "ffmpeg -i \"{}\" -c copy \"{}_{}.mp4\"",
                link,
                sanitized,
                index + 1
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[test]
    fn test_default_command_uses_best_and_title_template() {
        let command = DownloadCommand::new(URL).build().unwrap();
        assert_eq!(
            command,
            format!(
                "yt-dlp -f \"bv*+ba/b\" --merge-output-format mp4 -o \"%(title)s.%(ext)s\" \"{}\"",
                URL
            )
        );
    }

    #[test]
    fn test_quality_ceiling_limits_height() {
        let command = DownloadCommand::new(URL)
            .with_quality(QualityCeiling::P1080)
            .build()
            .unwrap();
        assert!(command.contains("-f \"bv*[height<=1080]+ba/b[height<=1080]\""));
    }

    #[test]
    fn test_audio_only_extracts_mp3() {
        let command = DownloadCommand::new(URL)
            .with_audio_only(true)
            .with_filename(Some("episode".to_string()))
            .build()
            .unwrap();
        assert!(command.contains("-f bestaudio -x --audio-format mp3"));
        assert!(command.contains("-o \"episode.mp3\""));
        assert!(!command.contains("--merge-output-format"));
    }

    #[test]
    fn test_filename_extension_completion() {
        let keeps_extension = DownloadCommand::new(URL)
            .with_filename(Some("clip.mkv".to_string()))
            .build()
            .unwrap();
        assert!(keeps_extension.contains("-o \"clip.mkv\""));

        let appends_container = DownloadCommand::new(URL)
            .with_filename(Some("clip".to_string()))
            .with_container(Container::Webm)
            .build()
            .unwrap();
        assert!(appends_container.contains("-o \"clip.webm\""));
    }

    #[test]
    fn test_blank_url_builds_nothing() {
        assert!(DownloadCommand::new("   ").build().is_none());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename(r#"What? A "Great" Video: Pt 1/2"#),
            "What_ A _Great_ Video_ Pt 1_2"
        );
        assert_eq!(sanitize_filename("already fine"), "already fine");
    }

    #[test]
    fn test_ffmpeg_single_command() {
        assert_eq!(
            ffmpeg_command("https://fictional-stream-link.com/a.mp4", "My/Video"),
            "ffmpeg -i \"https://fictional-stream-link.com/a.mp4\" -c copy \"My_Video.mp4\""
        );
    }

    #[test]
    fn test_ffmpeg_batch_commands_are_indexed() {
        let links = vec![
            "https://fictional-stream-link.com/a.mp4".to_string(),
            "https://fictional-stream-link.com/b.mp4".to_string(),
        ];
        let commands = ffmpeg_commands("Title", &links);
        let lines: Vec<&str> = commands.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("\"Title_1.mp4\""));
        assert!(lines[1].ends_with("\"Title_2.mp4\""));
    }
}
