use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use std::io::Write;

/// Which facet of the object `cat-object` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatObjectMode {
    /// `-t`: the object kind
    Kind,
    /// `-s`: the payload size in bytes
    Size,
    /// `-p`: the pretty-printed payload
    Pretty,
}

impl Repository {
    pub fn cat_object(&mut self, mode: CatObjectMode, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let oid = self.resolve_revision(name)?;

        match mode {
            CatObjectMode::Kind => {
                let (kind, _) = self.database().object_kind(&oid)?;
                writeln!(self.writer(), "{}", kind)?;
            }
            CatObjectMode::Size => {
                let (_, size) = self.database().object_kind(&oid)?;
                writeln!(self.writer(), "{}", size)?;
            }
            CatObjectMode::Pretty => match self.database().parse_object(&oid)? {
                // blobs print byte-exact, without a synthetic newline
                ObjectBox::Blob(blob) => {
                    self.writer().write_all(blob.content())?;
                }
                parsed => {
                    writeln!(self.writer(), "{}", parsed.display())?;
                }
            },
        }

        Ok(())
    }
}
