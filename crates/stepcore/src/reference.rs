const USER_INPUT_PREFIX: &str = "$input.";

/// A parsed input-mapping value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `$input.<key>`: a user-supplied run input.
    UserInput(&'a str),
    /// `<step_id>.<dot.path>`: a field of another step's output.
    StepOutput { step_id: &'a str, path: Vec<&'a str> },
    /// Anything else, passed through unchanged.
    Literal(&'a str),
}

impl<'a> Reference<'a> {
    pub fn parse(expr: &'a str) -> Self {
        if let Some(key) = expr.strip_prefix(USER_INPUT_PREFIX) {
            return Reference::UserInput(key);
        }
        match expr.split_once('.') {
            Some((step_id, rest)) => Reference::StepOutput {
                step_id,
                path: rest.split('.').collect(),
            },
            None => Reference::Literal(expr),
        }
    }

    /// The referenced step id, if this points at a step output.
    pub fn step_id(&self) -> Option<&'a str> {
        match self {
            Reference::StepOutput { step_id, .. } => Some(step_id),
            _ => None,
        }
    }
}
