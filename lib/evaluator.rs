use anyhow::{bail, Result};

use crate::{
    ast::{Expression, Operator, UnaryOperator},
    dispatch::{self, Entry},
    environment::Environment,
    error::EvalError,
    functions::Functions,
    operand::Operand,
    scalar::Scalar,
};

pub struct Evaluator<'a> {
    env: &'a Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    pub fn eval(&self, expression: &Expression) -> Result<Operand> {
        let operand = match expression {
            Expression::Number(value) => Operand::Scalar(value.clone()),
            Expression::Variable(name) => self.env.get(*name)?.clone(),
            Expression::Unary {
                operator: UnaryOperator::Negate,
                operand,
            } => dispatch::negate(&self.eval(operand)?)?,
            Expression::Binary {
                operator,
                left,
                right,
            } => self.eval_binary(*operator, left, right)?,
            Expression::Call { name, arguments } => self.eval_call(name, arguments)?,
        };
        if !operand.is_finite() {
            bail!(EvalError::NotEvaluable(format!(
                "{} produced a non-finite value",
                expression
            )));
        }
        Ok(operand)
    }

    fn eval_binary(
        &self,
        operator: Operator,
        left: &Expression,
        right: &Expression,
    ) -> Result<Operand> {
        match operator {
            Operator::Add => self.eval_with_table(left, right, dispatch::ADD),
            Operator::Subtract => self.eval_with_table(left, right, dispatch::SUBTRACT),
            Operator::Multiply => self.eval_with_table(left, right, dispatch::MULTIPLY),
            Operator::Divide => self.eval_divide(left, right),
            Operator::Power => self.eval_power(left, right),
        }
    }

    fn eval_with_table(
        &self,
        left: &Expression,
        right: &Expression,
        table: &[Entry],
    ) -> Result<Operand> {
        let left = self.eval(left)?;
        let right = self.eval(right)?;
        dispatch::dispatch(&left, &right, table)
    }

    // The divisor goes first so `x / 0` fails before `x` is looked up.
    fn eval_divide(&self, left: &Expression, right: &Expression) -> Result<Operand> {
        let right = self.eval(right)?;
        if right.is_zero_scalar() {
            bail!(EvalError::DivisionByZero);
        }
        let left = self.eval(left)?;
        dispatch::dispatch(&left, &right, dispatch::DIVIDE)
    }

    fn eval_power(&self, base: &Expression, exponent: &Expression) -> Result<Operand> {
        if exponent.is_transpose_marker() {
            return dispatch::transpose(&self.eval(base)?);
        }
        if exponent.is_minus_one() {
            return dispatch::invert(&self.eval(base)?);
        }
        self.eval_with_table(base, exponent, dispatch::POWER)
    }

    fn eval_call(&self, name: &str, arguments: &[Expression]) -> Result<Operand> {
        let definition = Functions::check_arity(name, arguments.len())?;
        let args = arguments
            .iter()
            .map(|argument| match self.eval(argument)? {
                Operand::Scalar(value) => Ok(value),
                other => bail!(EvalError::NonScalarArgument {
                    name: name.to_string(),
                    kind: other.kind(),
                }),
            })
            .collect::<Result<Vec<Scalar>>>()?;
        Ok(Operand::Scalar((definition.func)(&args)?.simplify()))
    }
}

pub fn evaluate(expression: &Expression, env: &Environment) -> Result<Operand> {
    Evaluator::new(env).eval(expression)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        linalg::{Matrix, Orientation, Vector},
        operand::OperandKind,
        parser::{parse, MAX_HEIGHT},
    };

    fn scalar(value: i64) -> Operand {
        Operand::Scalar(Scalar::from_integer(value))
    }

    fn ratio(numerator: i64, denominator: i64) -> Operand {
        Operand::Scalar(Scalar::from_ratio(numerator, denominator).unwrap())
    }

    fn matrix(rows: Vec<Vec<Operand>>) -> Operand {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_scalar().unwrap().clone())
                    .collect()
            })
            .collect();
        Operand::Matrix(Matrix::from_rows(rows).unwrap())
    }

    fn integers(rows: &[&[i64]]) -> Operand {
        matrix(
            rows.iter()
                .map(|row| row.iter().map(|&v| scalar(v)).collect())
                .collect(),
        )
    }

    fn vector(components: &[i64]) -> Operand {
        Operand::Vector(
            Vector::new(components.iter().map(|&v| Scalar::from_integer(v)).collect()).unwrap(),
        )
    }

    fn test_env() -> Environment {
        let mut env = Environment::new();
        env.set('x', scalar(3));
        env.set('A', integers(&[&[1, 2], &[3, 4]]));
        env.set('M', integers(&[&[1, 2, 3], &[4, 5, 6]]));
        env.set('S', integers(&[&[1, 2], &[2, 4]]));
        env.set('v', vector(&[1, 1]));
        env
    }

    fn test_eval(input: &str) -> Result<Operand> {
        let expression = parse(input).unwrap();
        evaluate(&expression, &test_env())
    }

    #[test]
    fn test_eval_scalar_expressions() {
        let tests = vec![
            ("5", scalar(5)),
            ("0.25", ratio(1, 4)),
            ("12.5", ratio(25, 2)),
            ("1 + 2 \\cdot 3", scalar(7)),
            ("2^3^2", scalar(64)),
            ("(2^3)^2", scalar(64)),
            ("2x", scalar(6)),
            ("x^2 - 2", scalar(7)),
            ("\\frac12", ratio(1, 2)),
            ("\\frac{12}{3}", scalar(4)),
            ("1/2 + 1/3", ratio(5, 6)),
            ("2^{-1}", ratio(1, 2)),
            ("2^-1", ratio(1, 2)),
            ("4^{\\frac12}", scalar(2)),
            ("-2^2", scalar(4)),
            ("3 - -x", scalar(6)),
            ("\\left(1 + 2\\right)^2", scalar(9)),
            ("\\sin 0", scalar(0)),
            ("\\cos 0", scalar(1)),
            ("\\tan{0}", scalar(0)),
            ("\\cos\\pi", scalar(-1)),
            ("\\frac-123", scalar(-4)),
            ("\\frac-{1}2", ratio(-1, 2)),
            ("1^{5000}", scalar(1)),
            ("(-1)^{5001}", scalar(-1)),
        ];

        for (input, expected) in tests {
            let evaluated = test_eval(input).unwrap();
            assert_eq!(evaluated, expected, "{}", input);
        }
    }

    #[test]
    fn test_function_results_collapse_to_exact() {
        let evaluated = test_eval("\\cos\\pi + 1").unwrap();
        assert!(evaluated.as_scalar().unwrap().is_exact());
        assert_eq!(evaluated, scalar(0));
    }

    #[test]
    fn test_eval_constants() {
        let tests = vec![
            ("e", std::f64::consts::E),
            ("\\e", std::f64::consts::E),
            ("\\pi", std::f64::consts::PI),
            ("2\\pi", 2.0 * std::f64::consts::PI),
        ];

        for (input, expected) in tests {
            let evaluated = test_eval(input).unwrap();
            let value = evaluated.as_scalar().unwrap();
            assert!(!value.is_exact(), "{}", input);
            assert!((value.to_f64() - expected).abs() < 1e-12, "{}", input);
        }
    }

    #[test]
    fn test_eval_linear_algebra() {
        let tests = vec![
            ("A + A", integers(&[&[2, 4], &[6, 8]])),
            ("A - A", integers(&[&[0, 0], &[0, 0]])),
            ("A A", integers(&[&[7, 10], &[15, 22]])),
            ("A \\cdot A", integers(&[&[7, 10], &[15, 22]])),
            ("2A", integers(&[&[2, 4], &[6, 8]])),
            ("A \\cdot 2", integers(&[&[2, 4], &[6, 8]])),
            ("-A", integers(&[&[-1, -2], &[-3, -4]])),
            ("A v", vector(&[3, 7])),
            ("2v", vector(&[2, 2])),
            ("v + v", vector(&[2, 2])),
            (
                "v / 2",
                Operand::Vector(
                    Vector::new(vec![Scalar::from_ratio(1, 2).unwrap(); 2]).unwrap(),
                ),
            ),
            (
                "A / 2",
                matrix(vec![vec![ratio(1, 2), scalar(1)], vec![ratio(3, 2), scalar(2)]]),
            ),
            (
                "A^{-1}",
                matrix(vec![vec![scalar(-2), scalar(1)], vec![ratio(3, 2), ratio(-1, 2)]]),
            ),
            ("A^{-1} A", integers(&[&[1, 0], &[0, 1]])),
            ("A / A", integers(&[&[1, 0], &[0, 1]])),
            ("M^T", integers(&[&[1, 4], &[2, 5], &[3, 6]])),
            ("M^t", integers(&[&[1, 4], &[2, 5], &[3, 6]])),
            ("M^{T}", integers(&[&[1, 4], &[2, 5], &[3, 6]])),
        ];

        for (input, expected) in tests {
            let evaluated = test_eval(input).unwrap();
            assert_eq!(evaluated, expected, "{}", input);
        }
    }

    #[test]
    fn test_vector_transpose_flips_orientation() {
        let Operand::Vector(row) = test_eval("v^T").unwrap() else {
            panic!("expected a vector");
        };
        assert_eq!(row.orientation(), Orientation::Row);
        assert_eq!(row.to_string(), "(1, 1)ᵀ");

        let Operand::Vector(column) = test_eval("(v^T)^T").unwrap() else {
            panic!("expected a vector");
        };
        assert_eq!(column.orientation(), Orientation::Column);
    }

    #[test]
    fn test_error_handling() {
        use OperandKind::{Matrix as M, Scalar as S, Vector as V};

        let tests = vec![
            ("T", EvalError::ReservedKeyword('T')),
            ("t", EvalError::ReservedKeyword('t')),
            ("I", EvalError::ReservedKeyword('I')),
            ("y", EvalError::UnknownVariable('y')),
            ("1/0", EvalError::DivisionByZero),
            ("y/0", EvalError::DivisionByZero),
            ("A/0", EvalError::DivisionByZero),
            ("0^{-1}", EvalError::DivisionByZero),
            ("A+2", EvalError::UnsupportedTypes(M, S)),
            ("2+A", EvalError::UnsupportedTypes(S, M)),
            ("v - A", EvalError::UnsupportedTypes(V, M)),
            ("A^2", EvalError::UnsupportedTypes(M, S)),
            ("v / A", EvalError::UnsupportedTypes(V, M)),
            ("S^{-1}", EvalError::Singular),
            (
                "v^{-1}",
                EvalError::UnsupportedOperation {
                    operation: "inverse",
                    kind: V,
                },
            ),
            (
                "x^T",
                EvalError::UnsupportedOperation {
                    operation: "transpose",
                    kind: S,
                },
            ),
            (
                "\\sin A",
                EvalError::NonScalarArgument {
                    name: "sin".to_string(),
                    kind: M,
                },
            ),
        ];

        for (input, expected) in tests {
            let evaluated = test_eval(input);
            match evaluated {
                Ok(_) => panic!("no error returned for {}", input),
                Err(error) => assert_eq!(
                    error.downcast_ref::<EvalError>(),
                    Some(&expected),
                    "{}",
                    input
                ),
            }
        }
    }

    #[test]
    fn test_non_finite_results() {
        let tests = vec![
            "10^{400}\\pi",
            "10^{400}\\pi - 10^{400}\\pi",
            "10^{400} A \\pi",
            "9^{4096}^{4096}",
        ];

        for input in tests {
            match test_eval(input) {
                Ok(value) => panic!("no error returned for {}: {}", input, value),
                Err(error) => assert!(
                    matches!(
                        error.downcast_ref::<EvalError>(),
                        Some(EvalError::NotEvaluable(_))
                    ),
                    "{}: {}",
                    input,
                    error
                ),
            }
        }

        let exact = test_eval("10^{400} - 10^{400}").unwrap();
        assert_eq!(exact, scalar(0));
    }

    #[test]
    fn test_eval_at_height_limit() {
        let tests = vec![
            (vec!["1"; MAX_HEIGHT].join("+"), scalar(MAX_HEIGHT as i64)),
            (vec!["1"; MAX_HEIGHT].join("/"), scalar(1)),
            (vec!["1"; MAX_HEIGHT].join("^"), scalar(1)),
        ];

        for (input, expected) in tests {
            assert_eq!(test_eval(&input).unwrap(), expected);
        }
    }

    #[test]
    fn test_approximate_singular_matrix() {
        let mut env = test_env();
        env.set('B', test_eval("\\pi \\cdot S").unwrap());
        let error = evaluate(&parse("B^{-1}").unwrap(), &env).unwrap_err();
        assert_eq!(error.downcast_ref::<EvalError>(), Some(&EvalError::Singular));
    }

    #[test]
    fn test_dimension_mismatch() {
        for input in ["M M", "A + M", "M v"] {
            let error = test_eval(input).unwrap_err();
            assert!(
                matches!(
                    error.downcast_ref::<EvalError>(),
                    Some(EvalError::DimensionMismatch(_))
                ),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_reevaluation_is_pure() {
        let expression = parse("A^{-1} + A").unwrap();
        let env = test_env();
        let first = evaluate(&expression, &env).unwrap();
        let second = evaluate(&expression, &env).unwrap();
        assert_eq!(first, second);
        assert_eq!(env.get('A').unwrap(), &integers(&[&[1, 2], &[3, 4]]));
    }
}
