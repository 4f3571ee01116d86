pub(crate) mod decimal_string;
pub(crate) mod flag;
