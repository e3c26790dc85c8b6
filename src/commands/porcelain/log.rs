use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::collections::HashSet;
use std::io::Write;

impl Repository {
    /// Show the history reachable from a start revision (HEAD by default)
    ///
    /// Commits print in first-parent preorder. `graph` switches to DOT output
    /// suitable for rendering the parent DAG.
    pub fn log(&mut self, start: Option<&str>, graph: bool) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let start_oid = self.resolve_commit(start.unwrap_or("HEAD"))?;
        let commits = self.collect_history(&start_oid)?;

        if graph {
            self.render_graph(&commits)
        } else {
            self.render_medium(&commits)
        }
    }

    /// Reachable commits in first-parent preorder
    fn collect_history(
        &self,
        start: &ObjectId,
    ) -> anyhow::Result<Vec<(ObjectId, crate::artifacts::objects::commit::Commit)>> {
        let mut ordered = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![start.clone()];

        while let Some(oid) = stack.pop() {
            if !seen.insert(oid.clone()) {
                continue;
            }

            let commit = self
                .database()
                .parse_object_as_commit(&oid)?
                .ok_or_else(|| anyhow::anyhow!("object {} is not a commit", oid.short()))?;

            // parents pushed in reverse so the first parent pops first
            for parent in commit.parents().iter().rev() {
                stack.push(parent.clone());
            }

            ordered.push((oid, commit));
        }

        Ok(ordered)
    }

    fn render_medium(
        &self,
        commits: &[(ObjectId, crate::artifacts::objects::commit::Commit)],
    ) -> anyhow::Result<()> {
        for (oid, commit) in commits {
            writeln!(self.writer(), "{}", format!("commit {}", oid).yellow())?;
            writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
            writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
            writeln!(self.writer())?;
            for line in commit.message().lines() {
                writeln!(self.writer(), "    {}", line)?;
            }
            writeln!(self.writer())?;
        }

        Ok(())
    }

    fn render_graph(
        &self,
        commits: &[(ObjectId, crate::artifacts::objects::commit::Commit)],
    ) -> anyhow::Result<()> {
        writeln!(self.writer(), "digraph log {{")?;

        for (oid, commit) in commits {
            writeln!(
                self.writer(),
                "  \"{}\" [label=\"{}\\n{}\\n{}\"];",
                oid.short(),
                oid.short(),
                commit.author().name().replace('"', "'"),
                commit.short_message().replace('"', "'")
            )?;
            for parent in commit.parents() {
                writeln!(
                    self.writer(),
                    "  \"{}\" -> \"{}\";",
                    oid.short(),
                    parent.short()
                )?;
            }
        }

        writeln!(self.writer(), "}}")?;
        Ok(())
    }
}
