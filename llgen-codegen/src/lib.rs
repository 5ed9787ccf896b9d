//! Multi-file code generation buffer and template substitution (§4.8,
//! §4.9 of the specification): the emitter writes named output files into
//! a [`GeneratedCode`] via [`templating::Template`] substitutions, and the
//! CLI front end flushes it to disk once generation succeeds in full.

pub mod templating;

use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};

#[derive(Default)]
pub struct GeneratedCode {
    code: HashMap<PathBuf, String>,
}

impl GeneratedCode {
    pub fn new() -> Self {
        GeneratedCode::default()
    }

    pub fn add_generated_code<G>(
        &mut self,
        path: &Path,
        code_generator: G,
    ) -> Result<(), std::io::Error>
    where
        G: Fn(&mut dyn Write) -> Result<(), std::io::Error>,
    {
        let mut code = Vec::new();
        code_generator(&mut code)?;
        let path_buf = path.to_path_buf();
        if self.code.contains_key(&path_buf) {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "duplicate path",
            ))
        } else {
            self.code.insert(
                path_buf,
                String::from_utf8(code)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?,
            );
            Ok(())
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.code.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }
}
