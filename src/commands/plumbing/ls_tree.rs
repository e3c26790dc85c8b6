use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use std::io::Write;

impl Repository {
    /// List the entries of a tree-ish, optionally recursing into subtrees
    pub fn ls_tree(&mut self, target: &str, recursive: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let tree_oid = self.resolve_tree(target)?;
        self.list_tree_level(&tree_oid, recursive, "")
    }

    fn list_tree_level(
        &self,
        tree_oid: &ObjectId,
        recursive: bool,
        prefix: &str,
    ) -> anyhow::Result<()> {
        let tree = self
            .database()
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| anyhow::anyhow!("object {} is not a tree", tree_oid.short()))?;

        for (name, entry) in tree.into_entries() {
            let full_name = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };

            if entry.is_tree() && recursive {
                self.list_tree_level(&entry.oid, recursive, &full_name)?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    entry.mode.as_octal_str(),
                    entry.mode.object_type(),
                    entry.oid,
                    full_name
                )?;
            }
        }

        Ok(())
    }
}
