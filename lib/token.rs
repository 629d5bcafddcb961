use std::{collections::HashMap, fmt};

use lazy_static::lazy_static;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Command {
    Frac,
    Left,
    Right,
    Pi,
    Cdot,
    Lbrack,
    Rbrack,
    Sin,
    Cos,
    Tan,
    E,
}

lazy_static! {
    static ref COMMANDS: HashMap<&'static str, Command> = Command::ALL
        .iter()
        .map(|&command| (command.name(), command))
        .collect();
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Frac,
        Command::Left,
        Command::Right,
        Command::Pi,
        Command::Cdot,
        Command::Lbrack,
        Command::Rbrack,
        Command::Sin,
        Command::Cos,
        Command::Tan,
        Command::E,
    ];

    pub fn lookup(name: &str) -> Option<Command> {
        COMMANDS.get(name).copied()
    }

    /// The name written after the backslash.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Frac => "frac",
            Command::Left => "left",
            Command::Right => "right",
            Command::Pi => "pi",
            Command::Cdot => "cdot",
            Command::Lbrack => "lbrack",
            Command::Rbrack => "rbrack",
            Command::Sin => "sin",
            Command::Cos => "cos",
            Command::Tan => "tan",
            Command::E => "e",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Command(Command),

    Sum,
    Minus,
    Slash,
    Pow,
    Subscript,

    Lparen,
    Rparen,
    Lbrace,
    Rbrace,
    Lbracket,
    Rbracket,

    Digit(char),
    Period,
    Char(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Command(command) => write!(f, "\\{}", command.name()),

            Token::Sum => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Slash => write!(f, "/"),
            Token::Pow => write!(f, "^"),
            Token::Subscript => write!(f, "_"),

            Token::Lparen => write!(f, "("),
            Token::Rparen => write!(f, ")"),
            Token::Lbrace => write!(f, "{{"),
            Token::Rbrace => write!(f, "}}"),
            Token::Lbracket => write!(f, "["),
            Token::Rbracket => write!(f, "]"),

            Token::Digit(value) => write!(f, "{}", value),
            Token::Period => write!(f, "."),
            Token::Char(value) => write!(f, "{}", value),
        }
    }
}
