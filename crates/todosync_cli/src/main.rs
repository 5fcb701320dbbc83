//! Two-client sync demo over the local backend.
//!
//! # Responsibility
//! - Exercise create/toggle/sort/delete across two in-process clients
//!   sharing one backend, and print each client's rendered list.
//!
//! Usage: `todosync_cli [--db PATH] [--log-dir ABS_DIR] [--log-level LEVEL]`

use std::process::ExitCode;
use std::sync::Arc;
use todosync_core::{
    init_logging, ActorId, ClientResult, DraftField, LocalBackend, LogConfig, LogLevel,
    NoteClient,
};

#[derive(Debug, Default)]
struct CliArgs {
    db_path: Option<String>,
    log_dir: Option<String>,
    log_level: Option<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut args = args;
    while let Some(flag) = args.next() {
        let slot = match flag.as_str() {
            "--db" => &mut parsed.db_path,
            "--log-dir" => &mut parsed.log_dir,
            "--log-level" => &mut parsed.log_level,
            other => return Err(format!("unknown argument `{other}`")),
        };
        let value = args
            .next()
            .ok_or_else(|| format!("missing value for `{flag}`"))?;
        *slot = Some(value);
    }
    Ok(parsed)
}

type Client = NoteClient<Arc<LocalBackend>>;

fn create(client: &mut Client, name: &str, description: &str) -> ClientResult<()> {
    client.set_draft_field(DraftField::Name, name);
    client.set_draft_field(DraftField::Description, description);
    client.create_from_draft().map(|_| ())
}

fn print_view(label: &str, client: &Client) {
    println!("--- {label} ({})", client.actor());
    for line in client.view().to_lines() {
        println!("{line}");
    }
}

fn run(args: CliArgs) -> Result<(), String> {
    if let Some(log_dir) = args.log_dir.as_deref() {
        let level = args
            .log_level
            .unwrap_or_else(|| LogLevel::build_default().as_str().to_string());
        init_logging(&LogConfig::parse(&level, log_dir)?)?;
    }

    let backend = match args.db_path.as_deref() {
        Some(path) => LocalBackend::open(path),
        None => LocalBackend::in_memory(),
    }
    .map(Arc::new)
    .map_err(|err| format!("failed to open note store: {err}"))?;

    let mut alice = NoteClient::new(Arc::clone(&backend), ActorId::generate());
    let mut bob = NoteClient::new(Arc::clone(&backend), ActorId::generate());
    alice.connect().map_err(|err| err.to_string())?;
    bob.connect().map_err(|err| err.to_string())?;

    create(&mut alice, "Water plants", "balcony and kitchen").map_err(|err| err.to_string())?;
    create(&mut bob, "Call plumber", "kitchen sink drips").map_err(|err| err.to_string())?;
    alice.pump();
    bob.pump();

    if let Some(first) = bob.state().notes.last().map(|note| note.id.clone()) {
        bob.toggle_completed(&first).map_err(|err| err.to_string())?;
    }
    alice.pump();
    alice.toggle_sort();
    print_view("alice", &alice);
    print_view("bob", &bob);

    if let Some(done) = alice
        .state()
        .notes
        .iter()
        .find(|note| note.completed)
        .map(|note| note.id.clone())
    {
        alice.delete(&done).map_err(|err| err.to_string())?;
    }
    alice.pump();
    bob.pump();
    print_view("alice after delete", &alice);
    print_view("bob after delete", &bob);

    for failure in alice.take_failures().into_iter().chain(bob.take_failures()) {
        eprintln!("warning: {failure}");
    }
    Ok(())
}

fn main() -> ExitCode {
    println!("todosync_core version={}", todosync_core::core_version());
    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_args;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_known_flags() {
        let parsed = parse_args(args(&["--db", "/tmp/x.db", "--log-level", "warn"]))
            .expect("flags should parse");
        assert_eq!(parsed.db_path.as_deref(), Some("/tmp/x.db"));
        assert_eq!(parsed.log_level.as_deref(), Some("warn"));
        assert_eq!(parsed.log_dir, None);
    }

    #[test]
    fn rejects_unknown_or_incomplete_flags() {
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["--db"])).is_err());
    }
}
