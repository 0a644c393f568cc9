use nutype::nutype;

pub const MAX_KEY_NAME_LENGTH: usize = 32;

/// Name of a non-printable input such as `<CR>` or `<C-w>`.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_KEY_NAME_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct KeyName(String);
