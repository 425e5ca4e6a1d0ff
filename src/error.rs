use crate::{Mark, ParseEventType};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizerError {
    #[error("{problem_mark}: {problem} {context} ({context_mark})")]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
}

impl TokenizerError {
    pub fn mark(&self) -> Mark {
        match self {
            TokenizerError::Problem { problem_mark, .. } => *problem_mark,
        }
    }

    pub fn problem(&self) -> &'static str {
        match self {
            TokenizerError::Problem { problem, .. } => problem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParserError {
    #[error("{mark}: {problem}")]
    Problem { problem: &'static str, mark: Mark },
    #[error("{mark}: {problem} {context} ({context_mark})")]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error("{mark}: found undefined alias `{name}`")]
    UndefinedAlias { name: String, mark: Mark },
    #[error("{mark}: did not find expected event {expected:?}, found {found:?}")]
    UnexpectedEvent {
        expected: ParseEventType,
        found: ParseEventType,
        mark: Mark,
    },
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

impl ParserError {
    pub fn mark(&self) -> Mark {
        match self {
            ParserError::Problem { mark, .. }
            | ParserError::ProblemWithContext { mark, .. }
            | ParserError::UndefinedAlias { mark, .. }
            | ParserError::UnexpectedEvent { mark, .. } => *mark,
            ParserError::Tokenizer(err) => err.mark(),
        }
    }
}
