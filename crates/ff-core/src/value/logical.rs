use crate::types::Kind;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LogicalValue {
    pub kind: Kind,
    pub value: bool,
}

impl LogicalValue {
    pub fn new(kind: Kind, value: bool) -> Self {
        Self { kind, value }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_true(&self) -> bool {
        self.value
    }

    pub fn not(&self) -> LogicalValue {
        Self {
            kind: self.kind,
            value: !self.value,
        }
    }
}
