pub mod ast;
pub mod callable;
pub mod dispatch;
pub mod engine;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod linalg;
pub mod loader;
pub mod operand;
pub mod parser;
pub mod scalar;
pub mod token;
pub mod transcript;

pub use callable::Callable;
pub use engine::{eval_latex, new_engine, Calculator, Engine};
pub use environment::Environment;
pub use evaluator::evaluate;
pub use lexer::Lexer;
pub use loader::{load_environment, load_operand};
pub use operand::{Operand, OperandKind};
pub use parser::{parse, Parser};
pub use scalar::Scalar;
pub use transcript::Transcript;
