use std::{
    fs,
    io::{self, Write},
};

use anyhow::{anyhow, bail, Result};
use latcalc::{Calculator, Engine, Transcript};
use log::debug;

const PROMPT: &str = ">> ";

const HELP: &str = r#"
  <expression>          evaluate, e.g. \frac{1}{2} + 2^{-1}
  :let <name> = <expr>  bind the result to a one-letter name
  :load <file>          merge variables from a JSON file
  :vars                 list bound variables
  :transcript           show this session
  :clear                clear the transcript
  :quit                 leave
"#;

pub enum Reply {
    Output(String),
    Quit,
}

pub struct Session {
    calculator: Calculator,
    transcript: Transcript,
}

impl Session {
    pub fn new(calculator: Calculator) -> Self {
        Self {
            calculator,
            transcript: Transcript::new(),
        }
    }

    pub fn handle(&mut self, line: &str) -> Result<Reply> {
        let line = line.trim();
        let reply = match line.strip_prefix(':') {
            Some(command) => self.handle_command(command)?,
            None if line.is_empty() => Reply::Output(String::new()),
            None => Reply::Output(self.calculator.run(line)?),
        };

        // Only evaluations and bindings are recorded.
        let recorded = !line.is_empty() && (!line.starts_with(':') || line.starts_with(":let"));
        if let (Reply::Output(output), true) = (&reply, recorded) {
            self.transcript.write(PROMPT);
            self.transcript.writeln(line);
            self.transcript.writeln(output);
        }
        Ok(reply)
    }

    fn handle_command(&mut self, command: &str) -> Result<Reply> {
        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (command, ""),
        };

        let output = match name {
            "let" => self.assign(argument)?,
            "load" => {
                let json = fs::read_to_string(argument)
                    .map_err(|error| anyhow!("could not read {}: {}", argument, error))?;
                let names = self.calculator.load_json(&json)?;
                debug!("loaded {:?} from {}", names, argument);
                format!("loaded {}", join_names(&names))
            }
            "vars" => self
                .calculator
                .environment()
                .names()
                .into_iter()
                .map(|name| {
                    let value = self.calculator.environment().get(name)?;
                    Ok(format!("{} = {}", name, value))
                })
                .collect::<Result<Vec<String>>>()?
                .join("\n"),
            "transcript" => self.transcript.contents().trim_end().to_string(),
            "clear" => {
                self.transcript.clear();
                String::new()
            }
            "help" => HELP.trim_matches('\n').to_string(),
            "quit" | "q" => return Ok(Reply::Quit),
            _ => bail!("unknown command :{}, try :help", name),
        };
        Ok(Reply::Output(output))
    }

    fn assign(&mut self, argument: &str) -> Result<String> {
        let Some((name, expression)) = argument.split_once('=') else {
            bail!("usage: :let <name> = <expression>");
        };
        let mut chars = name.trim().chars();
        let (Some(name), None) = (chars.next(), chars.next()) else {
            bail!("variable names must be a single character");
        };
        let value = self.calculator.assign(name, expression.trim())?;
        Ok(format!("{} = {}", name, value))
    }
}

fn join_names(names: &[char]) -> String {
    names
        .iter()
        .map(char::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

pub fn start(calculator: Calculator) -> Result<()> {
    let mut session = Session::new(calculator);
    println!("latcalc {}, :help for commands", env!("CARGO_PKG_VERSION"));

    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(());
        }

        match session.handle(&input) {
            Ok(Reply::Output(output)) if output.is_empty() => continue,
            Ok(Reply::Output(output)) => println!("{}", output),
            Ok(Reply::Quit) => return Ok(()),
            Err(err) => println!("error: {}", err),
        }
    }
}
