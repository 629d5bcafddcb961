use anyhow::{bail, Result};

use crate::{
    error::LexError,
    token::{Command, Token},
};

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let char = chars.first().copied();
        Self {
            chars,
            position: 0,
            char,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>> {
        while self.char.is_some_and(|char| char.is_whitespace()) {
            self.read_char();
        }

        let Some(char) = self.char else {
            return Ok(None);
        };

        let token = match char {
            '\\' => return self.read_command().map(Some),
            '{' => Token::Lbrace,
            '}' => Token::Rbrace,
            '(' => Token::Lparen,
            ')' => Token::Rparen,
            '[' => Token::Lbracket,
            ']' => Token::Rbracket,
            '+' => Token::Sum,
            '-' => Token::Minus,
            '/' => Token::Slash,
            '^' => Token::Pow,
            '.' => Token::Period,
            '_' => Token::Subscript,
            _ if char.is_ascii_digit() => Token::Digit(char),
            _ if char.is_alphabetic() => Token::Char(char),
            _ => bail!(LexError::UnrecognizedToken(char)),
        };

        self.read_char();

        Ok(Some(token))
    }

    fn read_char(&mut self) {
        self.position += 1;
        self.char = self.chars.get(self.position).copied();
    }

    fn read_command(&mut self) -> Result<Token> {
        self.read_char();
        let mut name = String::new();
        while let Some(char) = self.char.filter(|char| char.is_alphabetic()) {
            name.push(char);
            self.read_char();
        }
        match Command::lookup(&name) {
            Some(command) => Ok(Token::Command(command)),
            None => bail!(LexError::UnsupportedCommand(name)),
        }
    }
}
