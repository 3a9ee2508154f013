/// Maximum goal name length, in characters
pub const MAX_GOAL_NAME_LEN: usize = 100;

/// Decimal places kept on a goal's saved amount
pub const AMOUNT_DECIMAL_PRECISION: u32 = 2;

/// Largest target or single contribution a goal accepts, in whole units.
/// Keeps summary totals far inside `Decimal` range.
pub const MAX_GOAL_TARGET: i64 = 1_000_000_000_000_000;

/// Length of the generated goal identifier
pub const GOAL_ID_LEN: usize = 9;

/// Page size used when a listing does not ask for one
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Largest page size a listing may ask for
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Username length bounds for provisioned API users
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;

/// Sort criteria applied when none is stored
pub const DEFAULT_SORT_CRITERIA: &str = "date_desc";

/// Currency symbol used when amounts are shown to people
pub const CURRENCY_SYMBOL: &str = "₹";
