use giffos_core::{GifRef, QualityMode};
use giffos_session::{CopyPhase, SessionCommand, SessionEvent};

pub const HELP: &str = "\
commands:
  q <text>       set the search text (empty clears)
  hd on|off      switch quality; clears the search
  more           load the next page
  sel <n>        select result n (1-based)
  copy           copy the selected gif to the clipboard
  key <value>    set and save the API key
  quit           leave";

#[derive(Debug, PartialEq)]
pub enum ShellInput {
    Command(SessionCommand),
    Help,
    Quit,
}

/// Parses one shell line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ShellInput>, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (word, rest) = match line.trim_start().split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim(), ""),
    };

    let input = match word {
        "" => return Ok(None),
        "q" | "query" => ShellInput::Command(SessionCommand::SetQuery(rest.to_string())),
        "hd" => match rest.trim() {
            "on" => ShellInput::Command(SessionCommand::SetQuality(QualityMode::Hd)),
            "off" => ShellInput::Command(SessionCommand::SetQuality(QualityMode::Standard)),
            other => return Err(format!("hd expects on or off, got {:?}", other)),
        },
        "more" => ShellInput::Command(SessionCommand::LoadMore),
        "sel" | "select" => {
            let n: usize = rest
                .trim()
                .parse()
                .map_err(|_| format!("sel expects a number, got {:?}", rest.trim()))?;
            if n == 0 {
                return Err("results are numbered from 1".to_string());
            }
            ShellInput::Command(SessionCommand::Select(n - 1))
        }
        "copy" => ShellInput::Command(SessionCommand::Copy),
        "key" => ShellInput::Command(SessionCommand::SetApiKey(rest.trim().to_string())),
        "help" | "?" => ShellInput::Help,
        "quit" | "exit" => ShellInput::Quit,
        other => return Err(format!("unknown command {:?}, try help", other)),
    };
    Ok(Some(input))
}

pub fn format_results(gifs: &[GifRef]) -> String {
    if gifs.is_empty() {
        return "no results".to_string();
    }
    gifs.iter()
        .enumerate()
        .map(|(i, gif)| {
            let title = if gif.title.is_empty() { &gif.id } else { &gif.title };
            format!("{:>3}. {}  {}", i + 1, title, gif.url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable line for a session event. Logs are already on stderr via
/// tracing, so they print nothing here.
pub fn format_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Log { .. } => None,
        SessionEvent::ApiKeyLoaded(key) if key.is_empty() => {
            Some("no API key saved yet, set one with: key <value>".to_string())
        }
        SessionEvent::ApiKeyLoaded(_) => None,
        SessionEvent::QueryReset { quality } => {
            Some(format!("quality is now {:?}, search cleared", quality))
        }
        SessionEvent::Results { gifs, .. } => Some(format_results(gifs)),
        SessionEvent::Selection(Some(i)) => Some(format!("selected #{}", i + 1)),
        SessionEvent::Selection(None) => None,
        SessionEvent::Copy(phase) => match phase {
            CopyPhase::Idle => None,
            CopyPhase::Fetching => Some("copy: downloading...".to_string()),
            CopyPhase::Staging => Some("copy: staging file...".to_string()),
            CopyPhase::Handoff => Some("copy: handing to clipboard...".to_string()),
            CopyPhase::Confirmed => Some("copied!".to_string()),
            CopyPhase::Failed => Some("copy failed".to_string()),
        },
        SessionEvent::Error(message) => Some(format!("error: {}", message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> SessionCommand {
        match parse_line(line) {
            Ok(Some(ShellInput::Command(cmd))) => cmd,
            other => panic!("{:?} parsed to {:?}", line, other),
        }
    }

    #[test]
    fn query_keeps_inner_spaces() {
        assert_eq!(
            command("q funny  cat\n"),
            SessionCommand::SetQuery("funny  cat".to_string())
        );
        assert_eq!(command("q"), SessionCommand::SetQuery(String::new()));
    }

    #[test]
    fn select_is_one_based() {
        assert_eq!(command("sel 3"), SessionCommand::Select(2));
        assert!(parse_line("sel 0").is_err());
        assert!(parse_line("sel x").is_err());
    }

    #[test]
    fn quality_and_misc() {
        assert_eq!(command("hd on"), SessionCommand::SetQuality(QualityMode::Hd));
        assert_eq!(
            command("hd off"),
            SessionCommand::SetQuality(QualityMode::Standard)
        );
        assert!(parse_line("hd maybe").is_err());
        assert_eq!(command("more"), SessionCommand::LoadMore);
        assert_eq!(command("key  abc "), SessionCommand::SetApiKey("abc".into()));
        assert_eq!(parse_line("quit"), Ok(Some(ShellInput::Quit)));
        assert_eq!(parse_line("   "), Ok(None));
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn results_are_numbered_from_one() {
        let gifs = vec![
            GifRef {
                id: "a".into(),
                title: "Cat".into(),
                url: "https://m/a.gif".into(),
            },
            GifRef {
                id: "b".into(),
                title: String::new(),
                url: "https://m/b.gif".into(),
            },
        ];
        assert_eq!(
            format_results(&gifs),
            "  1. Cat  https://m/a.gif\n  2. b  https://m/b.gif"
        );
        assert_eq!(format_results(&[]), "no results");
    }
}
