//! Line-oriented commands for `rowmap session`.

use std::path::PathBuf;

use rowmap_recon::model::{EntryId, EntryKind, RecordId, Side};

pub const HELP: &str = "\
commands:
  map <source|target> <anchor-id> <id>[,<id>...]   pair anchor with records on the other side
  unmap <entry-id>                                 remove a mapping
  load <source|target> <path>                      replace one side's data (reload policy applies)
  remark <entry-id> [text...]                      set remarks (empty text clears)
  list [paired|source|target]                      show entries, optionally by kind
  search <source|target> [--unmapped] [term...]    find records containing term
  mapped <source|target> <id>                      is the record paired?
  summary                                          entry counts as JSON
  export [path]                                    write the mapped table (stdout if no path)
  width <grid> <field> [px]                        show or set a column width
  help                                             this text
  quit                                             end the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Map { side: Side, anchor: RecordId, selected: Vec<RecordId> },
    Unmap(EntryId),
    Load { side: Side, path: PathBuf },
    Remark { entry: EntryId, text: String },
    List(Option<EntryKind>),
    Search { side: Side, term: String, unmapped: bool },
    Mapped { side: Side, id: RecordId },
    Summary,
    Export(Option<PathBuf>),
    Width { grid: String, field: String, width: Option<u32> },
    Help,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = split_word(line);
    let cmd = match verb.to_ascii_lowercase().as_str() {
        "map" => {
            let (side, rest) = split_word(rest);
            let (anchor, rest) = split_word(rest);
            if anchor.is_empty() {
                return Err("usage: map <source|target> <anchor-id> <id>[,<id>...]".into());
            }
            let selected: Vec<RecordId> = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(RecordId::from)
                .collect();
            if selected.is_empty() {
                return Err("map needs at least one record id to pair with".into());
            }
            Command::Map { side: parse_side(side)?, anchor: RecordId::from(anchor), selected }
        }
        "unmap" => Command::Unmap(single_entry(rest, "unmap <entry-id>")?),
        "load" => {
            let (side, path) = split_word(rest);
            if path.is_empty() {
                return Err("usage: load <source|target> <path>".into());
            }
            Command::Load { side: parse_side(side)?, path: PathBuf::from(path) }
        }
        "remark" | "remarks" => {
            let (entry, text) = split_word(rest);
            if entry.is_empty() {
                return Err("usage: remark <entry-id> [text...]".into());
            }
            Command::Remark { entry: EntryId::from(entry), text: text.to_string() }
        }
        "list" | "ls" => {
            let kind = match rest.to_ascii_lowercase().as_str() {
                "" => None,
                "paired" | "mapped" => Some(EntryKind::Paired),
                "source" | "source_only" => Some(EntryKind::SourceOnly),
                "target" | "target_only" => Some(EntryKind::TargetOnly),
                other => return Err(format!("unknown entry kind: {other}")),
            };
            Command::List(kind)
        }
        "search" | "find" => {
            let (side, mut rest) = split_word(rest);
            let mut unmapped = false;
            if let Some(after) = rest.strip_prefix("--unmapped") {
                if after.is_empty() || after.starts_with(char::is_whitespace) {
                    unmapped = true;
                    rest = after.trim_start();
                }
            }
            Command::Search { side: parse_side(side)?, term: rest.to_string(), unmapped }
        }
        "mapped" => {
            let (side, id) = split_word(rest);
            if id.is_empty() || id.contains(char::is_whitespace) {
                return Err("usage: mapped <source|target> <id>".into());
            }
            Command::Mapped { side: parse_side(side)?, id: RecordId::from(id) }
        }
        "summary" => Command::Summary,
        "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "width" => {
            let mut parts = rest.split_whitespace();
            let (Some(grid), Some(field)) = (parts.next(), parts.next()) else {
                return Err("usage: width <grid> <field> [px]".into());
            };
            let width = match parts.next() {
                Some(px) => Some(
                    px.parse::<u32>()
                        .ok()
                        .filter(|w| *w > 0)
                        .ok_or_else(|| format!("invalid width: {px}"))?,
                ),
                None => None,
            };
            Command::Width { grid: grid.to_string(), field: field.to_string(), width }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Some(cmd))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn parse_side(s: &str) -> Result<Side, String> {
    if s.is_empty() {
        return Err("expected 'source' or 'target'".into());
    }
    s.parse::<Side>().map_err(|e| e.to_string())
}

fn single_entry(rest: &str, usage: &str) -> Result<EntryId, String> {
    if rest.is_empty() || rest.contains(char::is_whitespace) {
        return Err(format!("usage: {usage}"));
    }
    Ok(EntryId::from(rest))
}
