// Session loop: reads commands line by line and applies them to a
// ReconSession. Results go to `out`, diagnostics to `err`.

use std::io::{BufRead, Write};

use rowmap_config::LayoutStore;
use rowmap_io::ImportOptions;
use rowmap_recon::model::{MappingEntry, Record, Side};
use rowmap_recon::{Outcome, ReconSession};
use tracing::{debug, warn};

use crate::command::{self, Command, HELP};
use crate::exit_codes::{EXIT_SESSION_BAD_COMMAND, EXIT_SESSION_IGNORED};
use crate::CliError;

pub struct SessionHost {
    pub session: ReconSession,
    pub layout: LayoutStore,
    /// Options for files read by the `load` command.
    pub import: ImportOptions,
    /// Stop at the first bad command or ignored operation.
    pub strict: bool,
    /// Print a prompt before each line (interactive terminals only).
    pub prompt: bool,
}

/// What the loop should do after a command.
enum Flow {
    Continue,
    Quit,
}

impl SessionHost {
    pub fn new(session: ReconSession, layout: LayoutStore) -> Self {
        Self {
            session,
            layout,
            import: ImportOptions::default(),
            strict: false,
            prompt: false,
        }
    }

    pub fn run<R, W, E>(&mut self, input: R, out: &mut W, err: &mut E) -> Result<(), CliError>
    where
        R: BufRead,
        W: Write,
        E: Write,
    {
        let mut lines = input.lines();
        loop {
            if self.prompt {
                write!(out, "rowmap> ").map_err(write_error)?;
                out.flush().map_err(write_error)?;
            }
            let Some(line) = lines.next() else { break };
            let line = line.map_err(|e| CliError::io(format!("cannot read commands: {e}")))?;

            let cmd = match command::parse(&line) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(msg) => {
                    if self.strict {
                        return Err(CliError::new(EXIT_SESSION_BAD_COMMAND, msg)
                            .with_hint(format!("in line: {}", line.trim())));
                    }
                    writeln!(err, "error: {msg}").map_err(write_error)?;
                    continue;
                }
            };

            debug!(?cmd, "session command");
            match self.execute(cmd, out, err)? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    fn execute<W: Write, E: Write>(
        &mut self,
        cmd: Command,
        out: &mut W,
        err: &mut E,
    ) -> Result<Flow, CliError> {
        match cmd {
            Command::Map { side, anchor, selected } => {
                let outcome = self.session.map(side, &anchor, &selected);
                self.report(outcome, &format!("map {side} {anchor}"), out, err)?;
            }
            Command::Unmap(entry) => {
                let outcome = self.session.unmap(&entry);
                self.report(outcome, &format!("unmap {entry}"), out, err)?;
            }
            Command::Load { side, path } => {
                let loaded = if path.exists() {
                    rowmap_io::import(&path, self.import).map_err(CliError::parse)
                } else {
                    Err(CliError::io(format!("file not found: {}", path.display())))
                };
                match loaded {
                    Ok(dataset) => {
                        let records = dataset.len();
                        let entries = self.session.load(side, dataset).len();
                        writeln!(
                            out,
                            "ok: loaded {records} {side} record(s) from {} ({entries} entries)",
                            path.display()
                        )
                        .map_err(write_error)?;
                    }
                    Err(e) if self.strict => return Err(e),
                    Err(e) => writeln!(err, "error: {}", e.message).map_err(write_error)?,
                }
            }
            Command::Remark { entry, text } => {
                let outcome = self.session.update_remarks(&entry, text);
                self.report(outcome, &format!("remark {entry}"), out, err)?;
            }
            Command::List(kind) => {
                for entry in self.session.entries() {
                    if kind.is_some_and(|k| k != entry.kind()) {
                        continue;
                    }
                    writeln!(out, "{}", describe_entry(entry)).map_err(write_error)?;
                }
            }
            Command::Search { side, term, unmapped } => {
                let columns = &self.session.store().dataset(side).columns;
                for record in self.session.candidates(side, &term, unmapped) {
                    let marker = if self.session.is_mapped(side, &record.id) { '*' } else { ' ' };
                    writeln!(out, "{marker} {}", describe_record(record, columns))
                        .map_err(write_error)?;
                }
            }
            Command::Mapped { side, id } => {
                writeln!(out, "{}", self.session.is_mapped(side, &id)).map_err(write_error)?;
            }
            Command::Summary => {
                let summary = self.session.summary();
                let json = serde_json::to_string_pretty(&summary)
                    .map_err(|e| CliError::new(crate::exit_codes::EXIT_ERROR, e.to_string()))?;
                writeln!(out, "{json}").map_err(write_error)?;
            }
            Command::Export(path) => {
                let table = self.session.export();
                let delimiter = self.session.config().export_delimiter();
                let result = match &path {
                    Some(path) => rowmap_io::write_export(&table, path, delimiter).map(|()| {
                        format!("wrote {} row(s) to {}", table.len(), path.display())
                    }),
                    None => rowmap_io::export_to_string(&table, delimiter),
                };
                match result {
                    Ok(text) if path.is_some() => writeln!(out, "{text}").map_err(write_error)?,
                    Ok(text) => write!(out, "{text}").map_err(write_error)?,
                    Err(msg) if self.strict => return Err(CliError::io(msg)),
                    Err(msg) => writeln!(err, "error: {msg}").map_err(write_error)?,
                }
            }
            Command::Width { grid, field, width } => {
                if let Some(px) = width {
                    self.layout.set_width(&grid, &field, px);
                }
                writeln!(out, "{grid}.{field} = {}", self.layout.width(&grid, &field))
                    .map_err(write_error)?;
            }
            Command::Help => writeln!(out, "{HELP}").map_err(write_error)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn report<W: Write, E: Write>(
        &self,
        outcome: Outcome,
        what: &str,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), CliError> {
        match outcome {
            Outcome::Applied => {
                writeln!(out, "ok: {what} ({} entries)", self.session.entries().len())
                    .map_err(write_error)
            }
            Outcome::Ignored(reason) => {
                warn!("{what} ignored: {reason}");
                if self.strict {
                    return Err(CliError::new(EXIT_SESSION_IGNORED, format!("{what}: {reason}")));
                }
                writeln!(err, "ignored: {what}: {reason}").map_err(write_error)
            }
        }
    }
}

/// `<entry-id>\t<kind>\t<source>\t<target>\t<remarks>`, with `-` for a missing side.
pub fn describe_entry(entry: &MappingEntry) -> String {
    let side_id = |side: Side| {
        entry
            .record(side)
            .map(|r| r.id.to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    format!(
        "{}\t{}\t{}\t{}\t{}",
        entry.id(),
        entry.kind(),
        side_id(Side::Source),
        side_id(Side::Target),
        entry.remarks()
    )
}

/// Record id followed by its values in column order.
pub fn describe_record(record: &Record, columns: &[String]) -> String {
    let mut line = record.id.to_string();
    for col in columns {
        line.push('\t');
        if let Some(value) = record.get(col) {
            line.push_str(&value.to_string());
        }
    }
    line
}

fn write_error(e: std::io::Error) -> CliError {
    CliError::io(format!("cannot write output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_recon::model::{Dataset, RecordId};
    use rowmap_recon::ReconConfig;

    fn names(rows: &[&str]) -> Dataset {
        Dataset::new(
            vec!["name".into()],
            rows.iter()
                .enumerate()
                .map(|(i, n)| Record::from_pairs(RecordId::for_row(i), [("name", *n)]))
                .collect(),
        )
    }

    fn host() -> SessionHost {
        let session = ReconSession::with_data(
            ReconConfig::default(),
            names(&["Alice", "Bob"]),
            names(&["Alicia", "Robert", "Bobby"]),
        );
        SessionHost::new(session, LayoutStore::default())
    }

    fn run(host: &mut SessionHost, script: &str) -> (Result<(), CliError>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = host.run(script.as_bytes(), &mut out, &mut err);
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn map_then_list_paired() {
        let mut h = host();
        let (res, out, err) = run(&mut h, "map source row-1 row-1,row-2\nlist paired\n");
        assert!(res.is_ok());
        assert!(err.is_empty(), "{err}");
        assert!(out.contains("ok: map source row-1 (4 entries)"), "{out}");
        assert!(out.contains("mapping-row-1-row-1\tpaired\trow-1\trow-1\t"));
        assert!(out.contains("mapping-row-1-row-2\tpaired\trow-1\trow-2\t"));
    }

    #[test]
    fn ignored_ops_are_reported_and_loop_continues() {
        let mut h = host();
        let (res, out, err) = run(&mut h, "unmap mapping-x-y\nfrobnicate\nmapped source row-0\n");
        assert!(res.is_ok());
        assert!(err.contains("ignored: unmap mapping-x-y: entry not found"), "{err}");
        assert!(err.contains("unknown command"));
        assert_eq!(out.trim(), "false");
    }

    #[test]
    fn strict_stops_on_ignored_operation() {
        let mut h = host();
        h.strict = true;
        let (res, out, _) = run(&mut h, "unmap source-row-0\nlist\n");
        let e = res.unwrap_err();
        assert_eq!(e.code, EXIT_SESSION_IGNORED);
        assert!(e.message.contains("entry is not a mapping"));
        assert!(out.is_empty());
    }

    #[test]
    fn strict_stops_on_bad_command() {
        let mut h = host();
        h.strict = true;
        let (res, _, _) = run(&mut h, "map nowhere row-0 row-0\n");
        assert_eq!(res.unwrap_err().code, EXIT_SESSION_BAD_COMMAND);
    }

    #[test]
    fn search_marks_mapped_records() {
        let mut h = host();
        let (_, out, _) = run(&mut h, "map target row-0 row-0\nsearch target ali\nsearch source --unmapped\n");
        assert!(out.contains("* row-0\tAlicia"), "{out}");
        assert!(out.contains("  row-1\tBob"), "{out}");
        assert!(!out.contains("  row-0\tAlice"), "{out}");
    }

    #[test]
    fn load_replaces_one_side() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("more.csv");
        std::fs::write(&path, "name\nAlicia\nRobert\nBobby\nRoberta\n").unwrap();

        let mut h = host();
        h.session.set_reload_policy(rowmap_recon::ReloadPolicy::Retain);
        let script = format!(
            "map source row-0 row-0\nload target {}\nmapped source row-0\nload source {}\n",
            path.display(),
            dir.path().join("missing.csv").display()
        );
        let (res, out, err) = run(&mut h, &script);
        assert!(res.is_ok());
        assert!(out.contains("ok: loaded 4 target record(s)"), "{out}");
        assert!(out.ends_with("true\n"), "{out}");
        assert!(err.contains("error: file not found"), "{err}");
        assert_eq!(h.session.store().target.len(), 4);
    }

    #[test]
    fn strict_load_failure_is_fatal() {
        let mut h = host();
        h.strict = true;
        let (res, _, _) = run(&mut h, "load target /nonexistent/rowmap.csv\n");
        assert_eq!(res.unwrap_err().code, crate::exit_codes::EXIT_IO);
    }

    #[test]
    fn quit_stops_reading() {
        let mut h = host();
        let (_, out, _) = run(&mut h, "quit\nlist\n");
        assert!(out.is_empty());
    }

    #[test]
    fn width_updates_layout() {
        let mut h = host();
        let (_, out, _) = run(&mut h, "width mapped-grid remarks\nwidth mapped-grid remarks 320\n");
        assert_eq!(out, "mapped-grid.remarks = 150\nmapped-grid.remarks = 320\n");
        assert_eq!(h.layout.width("mapped-grid", "remarks"), 320);
    }

    #[test]
    fn export_to_stdout_and_remark() {
        let mut h = host();
        let script = "map source row-0 row-0\nremark mapping-row-0-row-0 same person\nexport\n";
        let (_, out, _) = run(&mut h, script);
        assert!(out.contains("source_name,target_name,remarks\n"), "{out}");
        assert!(out.contains("Alice,Alicia,same person\n"), "{out}");
    }
}
