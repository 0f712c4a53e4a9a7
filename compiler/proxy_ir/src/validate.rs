//! Control-flow validation of finished method bodies.
//!
//! Checked when a type is finished:
//! - the body ends in a control-terminal statement (`return` or `throw`)
//! - nothing follows the first terminal statement
//!
//! Type correctness is already enforced node by node while the body is
//! built, so only the statement sequence is inspected here.

use crate::{BuildError, MethodEmitter, Stmt};

/// Validate the statement sequence of one method.
pub fn validate_method(method: &MethodEmitter) -> Result<(), BuildError> {
    let statements = method.body().statements();
    let Some(terminal) = statements.iter().position(Stmt::is_terminal) else {
        return Err(BuildError::MissingTerminator {
            method: method.name().to_owned(),
        });
    };
    if terminal + 1 < statements.len() {
        return Err(BuildError::UnreachableStatement {
            method: method.name().to_owned(),
            index: terminal + 1,
        });
    }
    Ok(())
}
