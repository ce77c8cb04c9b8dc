//! Structured `Makefile.am` fragments.
//!
//! A fragment is an ordered list of declarations for one output directory,
//! rendered once when the directory is finished:
//!
//! ```text
//! libHirise_la_SOURCES = \
//!   Hirise/Hirise.cpp \
//!   Hirise/HiriseDistortion.cpp
//! libHirise_la_LIBADD =
//! lib_LTLIBRARIES = libHirise.la
//!
//! includedir = $(prefix)/include
//! include $(top_srcdir)/config/rules.mak
//! ```
//!
//! [`Fragment::assign`] picks `=` the first time a variable appears in a
//! fragment and `+=` afterwards, so accumulating declarations never clobber
//! earlier ones in the same file.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::Result;

use crate::util::fs::write_string;

/// Assignment operator of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Append,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::Append => "+=",
        }
    }
}

/// How values are laid out when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `name = a b c`
    Inline,
    /// One value per continuation line.
    Continued,
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub op: Operator,
    pub values: Vec<String>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Var(Declaration),
    Include(String),
    Blank,
}

/// An ordered set of declarations destined for one `Makefile.am`.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    entries: Vec<Entry>,
    seen: HashSet<String>,
}

impl Fragment {
    pub fn new() -> Self {
        Fragment::default()
    }

    /// Declare `name` inline, `=` on first use and `+=` afterwards.
    pub fn assign<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let op = self.first_use_operator(name);
        self.push(name, op, values, Layout::Inline)
    }

    /// Like [`Fragment::assign`] but one value per line.
    pub fn assign_list<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let op = self.first_use_operator(name);
        self.push(name, op, values, Layout::Continued)
    }

    /// Always `+=`; for variables seeded by an included rules file.
    pub fn append<I, S>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seen.insert(name.to_string());
        self.push(name, Operator::Append, values, Layout::Inline)
    }

    pub fn include(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::Include(path.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.entries.push(Entry::Blank);
        self
    }

    fn first_use_operator(&mut self, name: &str) -> Operator {
        if self.seen.insert(name.to_string()) {
            Operator::Assign
        } else {
            Operator::Append
        }
    }

    fn push<I, S>(&mut self, name: &str, op: Operator, values: I, layout: Layout) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(Entry::Var(Declaration {
            name: name.to_string(),
            op,
            values: values.into_iter().map(Into::into).collect(),
            layout,
        }));
        self
    }

    /// All declarations, in order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Var(decl) => Some(decl),
            _ => None,
        })
    }

    /// Every value given to `name`, across all its declarations.
    pub fn values_of(&self, name: &str) -> Vec<&str> {
        self.declarations()
            .filter(|d| d.name == name)
            .flat_map(|d| d.values.iter().map(String::as_str))
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Included rule files, in order.
    pub fn includes(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                Entry::Include(path) => Some(path.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render and write to `<dir>/Makefile.am`-style path.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        tracing::debug!("writing {}", path.display());
        write_string(path, &self.to_string())
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                Entry::Blank => writeln!(f)?,
                Entry::Include(path) => writeln!(f, "include {}", path)?,
                Entry::Var(decl) => {
                    write!(f, "{} {}", decl.name, decl.op.as_str())?;
                    match decl.layout {
                        Layout::Inline => {
                            if !decl.values.is_empty() {
                                write!(f, " {}", decl.values.join(" "))?;
                            }
                        }
                        Layout::Continued => {
                            for value in &decl.values {
                                write!(f, " \\\n  {}", value)?;
                            }
                        }
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}
