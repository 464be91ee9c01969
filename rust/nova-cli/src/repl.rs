//! Interactive REPL for NovaLang.

use nova_rt::value::Value;
use nova_rt::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const HELP: &str = "\
REPL commands:
  :help     show this help
  :env      list global bindings
  :quit     exit the session

Bindings persist for the whole session; the value of the last
expression statement is echoed.";

pub fn run() -> i32 {
    println!("NovaLang REPL — :help for commands, :quit to exit");
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("nova: cannot start line editor: {}", err);
            return 1;
        }
    };
    let mut interp = Interpreter::new();
    loop {
        match editor.readline("nova> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                match line {
                    ":quit" | ":q" => break,
                    ":help" => println!("{}", HELP),
                    ":env" => {
                        for name in interp.global_names() {
                            println!("{}", name);
                        }
                    }
                    _ => match interp.evaluate(line) {
                        Ok(Value::Undefined) => {}
                        Ok(value) => println!("{}", value.as_string()),
                        Err(diag) => {
                            eprintln!("{}", diag.render_with_source("<repl>", line))
                        }
                    },
                }
            }
            // Ctrl-C clears the line; Ctrl-D ends the session.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("nova: {}", err);
                return 1;
            }
        }
    }
    0
}
