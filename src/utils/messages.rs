//! Messages returned to the front-end.

// Generic
pub const ACTION_FAILED: &str = "action failed";
pub const SAVED: &str = "Saved successfully";
pub const DELETED: &str = "Deleted successfully";
pub const FORBIDDEN_BRANCH: &str = "You cannot access data of another branch";
pub const DATABASE_UNAVAILABLE: &str = "Database is not available";

// Auth and users
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USER_EXISTS: &str = "User already exists";
pub const USER_NOT_FOUND: &str = "User not found";
pub const ONLY_SUPERADMIN_GRANTS_SUPERADMIN: &str = "Only a superadmin can grant the superadmin role";
pub const TEACHER_EDITS_SELF_ONLY: &str = "Teachers may only edit their own lessons";

// Branches
pub const BRANCH_EXISTS: &str = "Branch code already exists";
pub const BRANCH_NOT_FOUND: &str = "Branch not found";
pub const BRANCH_IN_USE: &str = "Branch is in use and cannot be deleted";

// Games
pub const NO_SUCH_GAME: &str = "no such game";
pub const GAME_NOT_FOUND: &str = "Game not found";
pub const GAME_CREATED: &str = "Game created";
pub const GAME_CLONED: &str = "Game cloned";
pub const GAME_EXISTS: &str = "A game with this id already exists";
pub const VECTOR_EMPTY_FORM: &str = "Please fill in both vector size and angle";
pub const VECTOR_CORRECT: &str = "Well done, the vector is correct";
pub const VECTOR_WRONG: &str = "Wrong vector, try again";
pub const ATTEMPT_CORRECT: &str = "Correct vector";
pub const ATTEMPT_BAD: &str = "Bad vector";
pub const GAME_STARTED: &str = "Game started";
pub const GAME_STOPPED: &str = "Game stopped";

// Planning, exams, holidays
pub const SCHOOL_NOT_FOUND: &str = "School not found";
pub const CLASS_NOT_FOUND: &str = "Class not found";
pub const TEMPLATE_NOT_FOUND: &str = "Template not found";
pub const TEMPLATE_VERSION_CONFLICT: &str = "Template was changed by someone else, reload and try again";
pub const EXAM_NOT_FOUND: &str = "Exam not found";
pub const CALENDAR_NOT_FOUND: &str = "Calendar not found";
pub const COPY_SUFFIX: &str = " - copy";

// Lessons
pub const FORM_NOT_FOUND: &str = "Form not found";
pub const FORM_INACTIVE: &str = "Registration for this form is closed";
pub const FORM_FILL_ALL: &str = "Please fill in all fields";
pub const GROUP_NOT_FOUND: &str = "Lesson group not found";
pub const REGISTRATION_NOT_FOUND: &str = "Registration not found";
pub const REGISTERED: &str = "Registration received";
pub const ANSWER_TOO_SHORT: &str = "is too short, minimum length is";

// Playlists
pub const PLAYLIST_EXISTS: &str = "Playlist already exists";
pub const PLAYLIST_NOT_FOUND: &str = "Playlist not found";
