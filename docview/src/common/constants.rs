// doc constants
pub const DOC_ID: &str = "_id";
pub const FIELD_SEPARATOR: &str = ".";

// stage tags
pub const STAGE_MATCH: &str = "match";
pub const STAGE_PROJECT: &str = "project";
pub const STAGE_SORT: &str = "sort";

// operator prefix used by the json stage syntax ($match, $gt, ...)
pub const OPERATOR_PREFIX: &str = "$";

// extended json wrappers written by collection exports
pub const EXT_OID: &str = "$oid";
pub const EXT_DATE: &str = "$date";
pub const EXT_NUMBER_INT: &str = "$numberInt";
pub const EXT_NUMBER_LONG: &str = "$numberLong";
pub const EXT_NUMBER_DOUBLE: &str = "$numberDouble";
pub const EXT_NUMBER_DECIMAL: &str = "$numberDecimal";
