use anyhow::Result;

use crate::{
    ast::Expression, environment::Environment, evaluator::evaluate, lexer::Lexer, loader,
    operand::Operand, parser::Parser,
};

pub trait Engine {
    fn run(&mut self, input: &str) -> Result<String>;
}

/// Parses and evaluates `text` under `env`, or under the default environment.
pub fn eval_latex(text: &str, env: Option<&Environment>) -> Result<Operand> {
    let expression = Parser::new(Lexer::new(text))?.parse_program()?;
    match env {
        Some(env) => evaluate(&expression, env),
        None => evaluate(&expression, &Environment::new()),
    }
}

pub fn new_engine() -> Box<dyn Engine> {
    Box::new(Calculator::new())
}

/// A session: an environment that outlives single evaluations.
#[derive(Debug, Default, Clone)]
pub struct Calculator {
    env: Environment,
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_environment(Environment::new())
    }

    pub fn with_environment(env: Environment) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn parse(&self, input: &str) -> Result<Expression> {
        Parser::new(Lexer::new(input))?.parse_program()
    }

    pub fn evaluate(&self, input: &str) -> Result<Operand> {
        self.evaluate_expression(&self.parse(input)?)
    }

    pub fn evaluate_expression(&self, expression: &Expression) -> Result<Operand> {
        evaluate(expression, &self.env)
    }

    /// Evaluates `input` and binds the result to `name`.
    pub fn assign(&mut self, name: char, input: &str) -> Result<&Operand> {
        let value = self.evaluate(input)?;
        self.env.set(name, value);
        self.env.get(name)
    }

    /// Merges the JSON-described bindings over the current ones.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<char>> {
        loader::load_into(json, &mut self.env)
    }
}

impl Engine for Calculator {
    fn run(&mut self, input: &str) -> Result<String> {
        Ok(self.evaluate(input)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::EvalError, scalar::Scalar};

    #[test]
    fn test_engine_run() {
        let tests = vec![
            ("2^3^2", "64"),
            ("\\frac{1}{2} + \\frac{1}{3}", "5/6"),
            ("2^{-1}", "1/2"),
            ("-3", "-3"),
        ];

        let mut engine = new_engine();
        for (input, expected) in tests {
            assert_eq!(engine.run(input).unwrap(), expected);
        }
    }

    #[test]
    fn test_eval_latex() {
        assert_eq!(
            eval_latex("\\frac{12}{3}", None).unwrap(),
            Operand::Scalar(Scalar::from_integer(4))
        );

        let mut env = Environment::new();
        env.set('x', Operand::Scalar(Scalar::from_integer(3)));
        assert_eq!(
            eval_latex("2x", Some(&env)).unwrap(),
            Operand::Scalar(Scalar::from_integer(6))
        );

        let error = eval_latex("2x", None).unwrap_err();
        assert_eq!(
            error.downcast_ref::<EvalError>(),
            Some(&EvalError::UnknownVariable('x'))
        );
    }

    #[test]
    fn test_evaluate_parsed_expression() {
        let mut calculator = Calculator::new();
        calculator.assign('x', "3").unwrap();

        let tests = vec![("2x", "6"), ("\\frac-123", "-4"), ("x^{-1}", "1/3")];
        for (input, expected) in tests {
            let expression = calculator.parse(input).unwrap();
            let value = calculator.evaluate_expression(&expression).unwrap();
            assert_eq!(value.to_string(), expected, "{}", input);
            assert_eq!(calculator.evaluate(input).unwrap(), value, "{}", input);
        }
    }

    #[test]
    fn test_calculator_keeps_bindings() {
        let mut calculator = Calculator::new();
        calculator.assign('a', "\\frac12").unwrap();
        calculator.assign('b', "4a").unwrap();
        assert_eq!(calculator.run("a + b").unwrap(), "5/2");

        assert!(calculator.assign('c', "T").is_err());
        assert!(!calculator.environment().contains('c'));

        let names = calculator
            .load_json(r#"{"c": {"type": "Expression", "contents": "a b"}}"#)
            .unwrap();
        assert_eq!(names, vec!['c']);
        assert_eq!(calculator.run("c").unwrap(), "1");
    }
}
