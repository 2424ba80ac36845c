//! User-facing strings for the permission module: view titles, field
//! labels/placeholders, and notification texts. Kept in one place so the
//! surrounding application can swap or translate them wholesale.

pub const HELMET_TITLE: &str = "Permission";
pub const LIST_TITLE: &str = "Permissions";
pub const ADD_TITLE: &str = "Add Permission";
pub const EDIT_TITLE: &str = "Edit Permission";

pub const RESOURCE_LABEL: &str = "Resource";
pub const RESOURCE_PLACEHOLDER: &str = "Input resource name";
pub const DESCRIPTION_LABEL: &str = "Description";
pub const DESCRIPTION_PLACEHOLDER: &str = "Input description";
pub const METHOD_LABEL: &str = "Method";
pub const METHOD_PLACEHOLDER: &str = "Input method name";
pub const PATH_LABEL: &str = "Path";
pub const PATH_PLACEHOLDER: &str = "Input path name";
pub const DATE_LABEL: &str = "Created At";
pub const ADD_LABEL: &str = "Add New";
pub const ACTION_LABEL: &str = "Action";

pub const FIELD_REQUIRED: &str = "This field is required";
pub const ADD_SUCCESS: &str = "Added successfully";
pub const UPDATE_SUCCESS: &str = "Updated successfully";
pub const SERVER_ERROR: &str = "Something went wrong, please try again";
pub const DELETE_SUCCESS: &str = "Deleted successfully";
pub const DELETE_ERROR: &str = "Could not delete, please try again";
