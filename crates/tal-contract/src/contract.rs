use tal_ledger::{BookConfig, RecordBook};
use tal_store::LedgerStore;
use tal_types::VehicleRecord;
use tracing::{debug, info};

use crate::error::{ContractError, ContractResult};
use crate::function::Function;

/// Named-operation entry point over a [`RecordBook`].
///
/// Each invocation is one synchronous unit of work. Successful calls return
/// a byte payload, which is empty for pure writes.
pub struct Contract<S> {
    book: RecordBook<S>,
}

impl<S: LedgerStore> Contract<S> {
    pub fn new(store: S) -> Self {
        Self::from_book(RecordBook::new(store))
    }

    pub fn with_config(store: S, config: BookConfig) -> Self {
        Self::from_book(RecordBook::with_config(store, config))
    }

    pub fn from_book(book: RecordBook<S>) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &RecordBook<S> {
        &self.book
    }

    pub fn into_store(self) -> S {
        self.book.into_store()
    }

    /// Contract instantiation. Writes nothing.
    pub fn init(&self) -> ContractResult<Vec<u8>> {
        Ok(Vec::new())
    }

    /// Route `function` with `args` to the matching record operation.
    pub fn invoke<A: AsRef<str>>(&self, function: &str, args: &[A]) -> ContractResult<Vec<u8>> {
        let function = Function::parse(function)
            .ok_or_else(|| ContractError::InvalidFunction(function.to_string()))?;
        if let Some(expected) = function.arity() {
            if args.len() != expected {
                return Err(ContractError::Arity {
                    expected,
                    got: args.len(),
                });
            }
        }
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        debug!(%function, args = args.len(), "invoke");

        let book = &self.book;
        let payload = match (function, args.as_slice()) {
            (Function::QueryCar, [key]) => book.fetch_by_key(key)?,
            (Function::InitLedger, _) => {
                book.seed_fixtures()?;
                Vec::new()
            }
            (Function::CreateCar, [key, make, model, colour, owner]) => {
                book.create_vehicle(key, &VehicleRecord::new(*make, *model, *colour, *owner))?;
                Vec::new()
            }
            (Function::QueryAllCars, _) => book.query_all_vehicles()?,
            (Function::ChangeCarOwner, [key, owner]) => {
                book.change_owner(key, owner)?;
                Vec::new()
            }
            (Function::StoreMetaData, [user, metadata]) => {
                book.store_metadata(user, metadata)?;
                Vec::new()
            }
            (Function::StoreTalList, [entity_id, url]) => {
                book.append_trust_anchor(entity_id, url)?;
                Vec::new()
            }
            (Function::UserFetch, [user]) => book.query_user_metadata(user)?,
            (Function::FetchMetaData, [user]) => book.fetch_user_metadata(user)?,
            (f, args) => {
                return Err(ContractError::Arity {
                    expected: f.arity().unwrap_or_default(),
                    got: args.len(),
                })
            }
        };

        info!(%function, bytes = payload.len(), "invoke complete");
        Ok(payload)
    }
}

impl<S> std::fmt::Debug for Contract<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract").field("book", &self.book).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tal_ledger::LedgerError;
    use tal_store::InMemoryStore;

    fn contract() -> Contract<InMemoryStore> {
        Contract::new(InMemoryStore::new())
    }

    #[test]
    fn init_returns_empty_payload() {
        let c = contract();
        assert!(c.init().unwrap().is_empty());
        assert!(c.book().store().is_empty().unwrap());
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = contract().invoke("deleteCar", &["CAR0"]).unwrap_err();
        assert_eq!(err, ContractError::InvalidFunction("deleteCar".into()));
        assert_eq!(err.to_string(), "Invalid Smart Contract function name.");
    }

    #[test]
    fn arity_is_checked_before_any_store_access() {
        let c = contract();
        let err = c.invoke("createCar", &["CAR0", "Toyota"]).unwrap_err();
        assert_eq!(err, ContractError::Arity { expected: 5, got: 2 });
        assert_eq!(err.to_string(), "Incorrect number of arguments. Expecting 5");
        assert!(c.book().store().is_empty().unwrap());
    }

    #[test]
    fn zero_argument_functions_ignore_extra_args() {
        let c = contract();
        assert_eq!(c.invoke("queryAllCars", &["ignored"]).unwrap(), b"[]");
    }

    #[test]
    fn ledger_errors_pass_through() {
        let err = contract().invoke("changeCarOwner", &["CAR9", "Z"]).unwrap_err();
        assert_eq!(
            err,
            ContractError::Ledger(LedgerError::NotFound { key: "CAR9".into() })
        );
    }
}
