use std::fmt;

/// Operations reachable through [`Contract::invoke`](crate::Contract::invoke).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    QueryCar,
    InitLedger,
    CreateCar,
    QueryAllCars,
    ChangeCarOwner,
    StoreMetaData,
    StoreTalList,
    UserFetch,
    FetchMetaData,
}

impl Function {
    pub const ALL: [Function; 9] = [
        Function::QueryCar,
        Function::InitLedger,
        Function::CreateCar,
        Function::QueryAllCars,
        Function::ChangeCarOwner,
        Function::StoreMetaData,
        Function::StoreTalList,
        Function::UserFetch,
        Function::FetchMetaData,
    ];

    /// Resolve an invocation name. Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::QueryCar => "queryCar",
            Self::InitLedger => "initLedger",
            Self::CreateCar => "createCar",
            Self::QueryAllCars => "queryAllCars",
            Self::ChangeCarOwner => "changeCarOwner",
            Self::StoreMetaData => "storeMetaData",
            Self::StoreTalList => "storeTalList",
            Self::UserFetch => "userFetch",
            Self::FetchMetaData => "fetchMetaData",
        }
    }

    /// Required argument count, or `None` when arguments are ignored.
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Self::InitLedger | Self::QueryAllCars => None,
            Self::QueryCar | Self::UserFetch | Self::FetchMetaData => Some(1),
            Self::ChangeCarOwner | Self::StoreMetaData | Self::StoreTalList => Some(2),
            Self::CreateCar => Some(5),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_parses_back() {
        for f in Function::ALL {
            assert_eq!(Function::parse(f.name()), Some(f));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert_eq!(Function::parse("querycar"), None);
        assert_eq!(Function::parse("QueryCar"), None);
        assert_eq!(Function::parse(""), None);
    }
}
