use {common::char_enum, def::Uuid};

char_enum! {
    /// Kind of a dependent or provider, stored as its finder.
    enum DependableKind {
        Table = 'T',
        View = 'V',
        Column = 'L',
        Conglomerate = 'I',
        Constraint = 'C',
        Trigger = 'G',
        StoredStatement = 'S',
        Alias = 'A',
        Sequence = 'Q',
        Schema = 'H',
        File = 'J',
        DefaultValue = 'D',
        Permission = 'P',
        Role = 'R',
    }
}

/// A stored dependency of one object on another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    pub dependent_id: Uuid,
    pub dependent_kind: DependableKind,
    pub provider_id: Uuid,
    pub provider_kind: DependableKind,
}

impl DependencyDescriptor {
    pub fn new(
        dependent_id: Uuid,
        dependent_kind: DependableKind,
        provider_id: Uuid,
        provider_kind: DependableKind,
    ) -> Self {
        Self {
            dependent_id,
            dependent_kind,
            provider_id,
            provider_kind,
        }
    }
}
