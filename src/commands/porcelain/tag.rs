use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use crate::artifacts::core::Fatal;
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::refs::ref_name::RefName;
use std::io::Write;

impl Repository {
    /// List tags, or create one pointing at `target` (HEAD by default)
    ///
    /// A lightweight tag is a direct ref to the target object. With
    /// `annotate`, a tag object naming the target is created first and the
    /// ref points at it; annotated tags require a message.
    pub fn tag(
        &mut self,
        name: Option<&str>,
        target: Option<&str>,
        annotate: bool,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let name = match name {
            None => return self.list_tags(),
            Some(name) => name,
        };

        let name = RefName::try_parse(name)
            .map_err(|err| Fatal::Usage(format!("fatal: {}", err)))?;

        let tag_path = Refs::tag_ref(name.as_ref());
        if self.refs().ref_exists(&tag_path) {
            return Err(Fatal::Usage(format!("fatal: tag '{}' already exists.", name)).into());
        }

        let target_oid = self.resolve_revision(target.unwrap_or("HEAD"))?;

        if annotate {
            let message = message.ok_or_else(|| {
                Fatal::Usage("annotated tags require a message (-m)".to_string())
            })?;
            let (target_type, _) = self.database().object_kind(&target_oid)?;

            let tag = Tag::new(
                target_oid,
                target_type,
                name.to_string(),
                Author::load_from_env(),
                message.trim().to_string(),
            );
            let tag_oid = self.database().store(&tag)?;
            self.refs().update_ref(&tag_path, tag_oid.as_ref(), false)?;
        } else {
            self.refs().update_ref(&tag_path, target_oid.as_ref(), false)?;
        }

        Ok(())
    }

    fn list_tags(&mut self) -> anyhow::Result<()> {
        for tag in self.refs().list_refs("tags")? {
            writeln!(self.writer(), "{}", tag)?;
        }

        Ok(())
    }
}
