use serde::Serialize;
use std::{fmt, ops};

/// Represents the identifier of a tag inside a mailbox.
pub type TagId = u32;

/// Represents a tag of the mailbox tag namespace.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Represents the ordered list of tag ids applied to a message.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct Tags(pub Vec<TagId>);

impl ops::Deref for Tags {
    type Target = Vec<TagId>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Tags {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<TagId> for Tags {
    fn from_iter<T: IntoIterator<Item = TagId>>(iter: T) -> Self {
        Tags(iter.into_iter().collect())
    }
}

/// Formats tag ids as a comma separated list, which is the form the
/// mailbox store persists.
impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut glue = "";

        for id in self.iter() {
            write!(f, "{}{}", glue, id)?;
            glue = ",";
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Tags;

    #[test]
    fn display_tags() {
        assert_eq!("", Tags::default().to_string());
        assert_eq!("64", Tags::from_iter([64]).to_string());
        assert_eq!("64,66,65", Tags::from_iter([64, 66, 65]).to_string());
    }
}
