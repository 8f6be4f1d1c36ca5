//! Interactive terminal.
//!
//! Each line is sent as one statement on a fresh connection and the reply is
//! printed raw, errors included, the way the engine's own REPL shows them.

use csql_client::client::CsqlClient;
use csql_client::error::{CsqlError, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;
use tracing::{debug, info};

const PROMPT: &str = "csql> ";

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Exit,
    Skip,
    Query(&'a str),
}

fn classify(line: &str) -> ReplInput<'_> {
    match line.trim() {
        "exit" | "quit" => ReplInput::Exit,
        "" => ReplInput::Skip,
        sql => ReplInput::Query(sql),
    }
}

/// Runs the prompt loop until `exit`, `quit` or end of input.
pub fn run(runtime: &Runtime, client: &CsqlClient) -> Result<()> {
    let mut editor =
        DefaultEditor::new().map_err(|e| CsqlError::internal(format!("readline: {e}")))?;

    println!("--- CSQL REPL ---");
    println!("Connected to {}", client.endpoint());
    println!("Type 'exit' to quit\n");
    info!("REPL started against {}", client.endpoint());

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(CsqlError::internal(format!("readline: {e}"))),
        };

        match classify(&line) {
            ReplInput::Exit => break,
            ReplInput::Skip => continue,
            ReplInput::Query(sql) => {
                if let Err(e) = editor.add_history_entry(sql) {
                    debug!("Could not record history: {}", e);
                }
                let reply = runtime.block_on(client.execute_raw(sql));
                print!("{reply}");
                if !reply.ends_with('\n') {
                    println!();
                }
            }
        }
    }

    info!("REPL finished");
    Ok(())
}
