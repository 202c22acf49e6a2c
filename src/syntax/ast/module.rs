use std::collections::HashMap;

use crate::{pid::Pid, syntax::Span};


/// An import binding. `import_name` is None for namespace imports, and is the `default`
/// pid for default imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
	pub module: Pid,
	pub import_name: Option<Pid>,
	pub local_name: Pid,
	pub span: Span,
}


/// An export. Local exports have a local name, indirect exports re-export an import name
/// of another module, and star exports have neither an export nor an import name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
	pub export_name: Option<Pid>,
	pub module: Option<Pid>,
	pub import_name: Option<Pid>,
	pub local_name: Option<Pid>,
	pub span: Span,
}


/// The import and export entries of a module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleRecord {
	pub imports: Vec<ImportEntry>,
	pub local_exports: Vec<ExportEntry>,
	pub indirect_exports: Vec<ExportEntry>,
	pub star_exports: Vec<ExportEntry>,
	/// Module specifiers, in order of first appearance.
	pub requested_modules: Vec<Pid>,
	exported: HashMap<Pid, Span>,
}


impl ModuleRecord {
	pub fn request(&mut self, module: Pid) {
		if !self.requested_modules.contains(&module) {
			self.requested_modules.push(module);
		}
	}


	pub fn add_import(&mut self, entry: ImportEntry) {
		self.request(entry.module);
		self.imports.push(entry);
	}


	/// Record an export. Returns the span of the previous export of the same name if the
	/// name was already exported.
	pub fn add_export(&mut self, entry: ExportEntry) -> Result<(), Span> {
		if let Some(name) = entry.export_name {
			if let Some(&previous) = self.exported.get(&name) {
				return Err(previous);
			}
			self.exported.insert(name, entry.span);
		}

		if let Some(module) = entry.module {
			self.request(module);
		}

		match entry {
			ExportEntry { export_name: None, .. } => self.star_exports.push(entry),
			ExportEntry { module: Some(_), .. } => self.indirect_exports.push(entry),
			_ => self.local_exports.push(entry),
		}

		Ok(())
	}


	/// Whether a name is exported.
	pub fn exports(&self, name: Pid) -> bool {
		self.exported.contains_key(&name)
	}
}
