use anyhow::{bail, Result};

use crate::{
    ast::{Expression, Operator},
    error::ParseError,
    lexer::Lexer,
    scalar::Scalar,
    token::{Command, Token},
};

/// Maximum nesting of operands inside operands (groups, `\frac`, functions).
pub const MAX_NESTING: usize = 128;
/// Maximum height of the produced syntax tree. Evaluation recurses once per level,
/// so this has to fit a default 2 MiB thread stack in a debug build.
pub const MAX_HEIGHT: usize = 512;

/// How a digit run in operand position is read.
///
/// `Long` collapses `12.5` into one number. `Short` takes a single digit so that
/// `\frac45` means four fifths.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Form {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bracket {
    Paren,
    Brace,
    Square,
}

impl Bracket {
    fn opener(token: &Token) -> Option<Self> {
        match token {
            Token::Lparen => Some(Bracket::Paren),
            Token::Lbrace => Some(Bracket::Brace),
            Token::Lbracket | Token::Command(Command::Lbrack) => Some(Bracket::Square),
            _ => None,
        }
    }

    fn closer(token: &Token) -> Option<Self> {
        match token {
            Token::Rparen => Some(Bracket::Paren),
            Token::Rbrace => Some(Bracket::Brace),
            Token::Rbracket | Token::Command(Command::Rbrack) => Some(Bracket::Square),
            _ => None,
        }
    }

    fn closing_token(self) -> Token {
        match self {
            Bracket::Paren => Token::Rparen,
            Bracket::Brace => Token::Rbrace,
            Bracket::Square => Token::Rbracket,
        }
    }
}

#[derive(Debug)]
enum Item {
    Operand(Expression),
    Operator(Operator),
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self> {
        Ok(Self {
            tokens: lexer.tokenize()?,
            position: 0,
            depth: 0,
        })
    }

    /// Parses a whole input; every token must be consumed.
    pub fn parse_program(&mut self) -> Result<Expression> {
        let expression = self.parse_expression()?;
        if let Some(token) = self.cur_token() {
            bail!(ParseError::ExpectedOperator(token.to_string()));
        }
        Ok(expression)
    }

    pub fn parse_expression(&mut self) -> Result<Expression> {
        let postfix = self.to_postfix()?;
        Self::postfix_to_tree(postfix)
    }

    fn cur_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next_token(&mut self) -> &mut Self {
        self.position += 1;
        self
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.cur_token() {
            Some(token) if *token == expected => {
                self.next_token();
                Ok(())
            }
            Some(token) => bail!(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.to_string(),
            }),
            None => bail!(ParseError::UnexpectedEnd(expected.to_string())),
        }
    }

    /// Consumes a binary operator if one is next.
    fn parse_operator(&mut self) -> Option<Operator> {
        let operator = match self.cur_token()? {
            Token::Command(Command::Cdot) => Operator::Multiply,
            Token::Pow => Operator::Power,
            Token::Sum => Operator::Add,
            Token::Minus => Operator::Subtract,
            Token::Slash => Operator::Divide,
            _ => return None,
        };
        self.next_token();
        Some(operator)
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self.cur_token(),
            Some(
                Token::Digit(_)
                    | Token::Char(_)
                    | Token::Lparen
                    | Token::Lbrace
                    | Token::Command(
                        Command::Frac
                            | Command::Left
                            | Command::Pi
                            | Command::E
                            | Command::Sin
                            | Command::Cos
                            | Command::Tan
                    )
            )
        )
    }

    fn to_postfix(&mut self) -> Result<Vec<Item>> {
        let mut operators: Vec<Operator> = Vec::new();
        let mut output = vec![Item::Operand(self.parse_operand(Form::Long)?)];

        loop {
            let operator = match self.parse_operator() {
                Some(operator) => operator,
                None if self.starts_operand() => Operator::Multiply,
                None => break,
            };

            while let Some(&top) = operators.last() {
                if operator.precedence() > top.precedence() {
                    break;
                }
                output.push(Item::Operator(top));
                operators.pop();
            }
            operators.push(operator);

            output.push(Item::Operand(self.parse_operand(Form::Long)?));
        }

        while let Some(operator) = operators.pop() {
            output.push(Item::Operator(operator));
        }

        Ok(output)
    }

    fn postfix_to_tree(postfix: Vec<Item>) -> Result<Expression> {
        let mut stack: Vec<(Expression, usize)> = Vec::new();

        for item in postfix {
            let (expression, height) = match item {
                Item::Operand(expression) => {
                    let height = expression.height();
                    (expression, height)
                }
                Item::Operator(operator) => {
                    let (Some((right, right_height)), Some((left, left_height))) =
                        (stack.pop(), stack.pop())
                    else {
                        bail!(ParseError::MalformedExpression);
                    };
                    (
                        Expression::binary(operator, left, right),
                        1 + left_height.max(right_height),
                    )
                }
            };
            if height > MAX_HEIGHT {
                bail!(ParseError::TooDeep(MAX_HEIGHT));
            }
            stack.push((expression, height));
        }

        match (stack.pop(), stack.is_empty()) {
            (Some((expression, _)), true) => Ok(expression),
            _ => bail!(ParseError::MalformedExpression),
        }
    }

    fn parse_operand(&mut self, form: Form) -> Result<Expression> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            bail!(ParseError::TooDeep(MAX_NESTING));
        }
        let operand = self.parse_operand_inner(form);
        self.depth -= 1;
        operand
    }

    fn parse_operand_inner(&mut self, form: Form) -> Result<Expression> {
        let Some(token) = self.cur_token().cloned() else {
            bail!(ParseError::UnexpectedEnd("operand".to_string()));
        };

        if let Some(operator) = self.parse_operator() {
            if !self.starts_operand() {
                bail!(ParseError::MissingUnaryOperand);
            }
            if operator != Operator::Subtract {
                bail!(ParseError::InvalidUnary(token.to_string()));
            }
            // A negated digit run is always read whole, even inside `\frac`.
            return Ok(Expression::negate(self.parse_operand(Form::Long)?));
        }

        match token {
            Token::Digit(digit) => match form {
                Form::Long => self.parse_number(),
                Form::Short => {
                    self.next_token();
                    let value = digit.to_digit(10).unwrap_or_default();
                    Ok(Expression::Number(Scalar::from_integer(value.into())))
                }
            },
            Token::Char(name) => {
                self.next_token();
                Ok(Expression::Variable(name))
            }
            Token::Lparen => self.parse_grouped_expression(Token::Rparen),
            Token::Lbrace => self.parse_grouped_expression(Token::Rbrace),
            Token::Command(command) => {
                self.next_token();
                self.parse_command(command)
            }
            token => bail!(ParseError::ExpectedOperand(token.to_string())),
        }
    }

    fn parse_command(&mut self, command: Command) -> Result<Expression> {
        match command {
            Command::Frac => self.parse_frac(),
            Command::Left => self.parse_left(),
            Command::Pi => Ok(Expression::Number(Scalar::pi())),
            Command::E => Ok(Expression::Number(Scalar::e())),
            Command::Sin | Command::Cos | Command::Tan => {
                let argument = self.parse_operand(Form::Long)?;
                Expression::call(command.name(), vec![argument])
            }
            Command::Right | Command::Cdot | Command::Lbrack | Command::Rbrack => {
                bail!(ParseError::ExpectedOperand(
                    Token::Command(command).to_string()
                ))
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expression> {
        let mut literal = String::new();
        while let Some(token) = self.cur_token() {
            match token {
                Token::Digit(digit) => literal.push(*digit),
                Token::Period => literal.push('.'),
                _ => break,
            }
            self.next_token();
        }
        Ok(Expression::Number(Scalar::from_decimal_str(&literal)?))
    }

    fn parse_grouped_expression(&mut self, closer: Token) -> Result<Expression> {
        self.next_token();
        let expression = self.parse_expression()?;
        self.expect(closer)?;
        Ok(expression)
    }

    /// `\frac` followed by two short-form operands; braces give the long form.
    fn parse_frac(&mut self) -> Result<Expression> {
        let numerator = self.parse_operand(Form::Short)?;
        let denominator = self.parse_operand(Form::Short)?;
        Ok(Expression::binary(Operator::Divide, numerator, denominator))
    }

    /// `\left` has been consumed; parses `<opener> expression \right <closer>`.
    fn parse_left(&mut self) -> Result<Expression> {
        let bracket = match self.cur_token() {
            Some(token) => match Bracket::opener(token) {
                Some(bracket) => bracket,
                None => bail!(ParseError::InvalidEncloser(format!(
                    "{} cannot follow \\left",
                    token
                ))),
            },
            None => bail!(ParseError::UnexpectedEnd("encloser after \\left".to_string())),
        };
        self.next_token();

        let expression = self.parse_expression()?;

        self.expect(Token::Command(Command::Right))?;

        match self.cur_token() {
            Some(token) if Bracket::closer(token) == Some(bracket) => {
                self.next_token();
                Ok(expression)
            }
            Some(token) => bail!(ParseError::InvalidEncloser(format!(
                "expected {} after \\right, found {}",
                bracket.closing_token(),
                token
            ))),
            None => bail!(ParseError::UnexpectedEnd(
                bracket.closing_token().to_string()
            )),
        }
    }
}

pub fn parse(input: &str) -> Result<Expression> {
    Parser::new(Lexer::new(input))?.parse_program()
}
