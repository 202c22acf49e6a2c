use std::{
	io,
	fs::{self, File},
	path::{Path, PathBuf},
};


/// Run the test on every file under the given directory, relative to the crate root.
/// Files are visited in name order, so that failures are reproducible.
pub fn test_dir<P, F>(path: P, mut test: F) -> io::Result<()>
where
	P: AsRef<Path>,
	F: FnMut(&Path, File) -> io::Result<()>,
{
	let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	dir.push(path);

	fn run<F>(dir: &Path, test: &mut F) -> io::Result<usize>
	where
		F: FnMut(&Path, File) -> io::Result<()>,
	{
		let mut paths = fs::read_dir(dir)?
			.map(|entry| entry.map(|entry| entry.path()))
			.collect::<io::Result<Vec<_>>>()?;
		paths.sort();

		let mut count = 0;

		for path in paths {
			if path.is_dir() {
				count += run(&path, test)?;
			} else {
				let file = File::open(&path)?;
				test(&path, file)?;
				count += 1;
			}
		}

		Ok(count)
	}

	let count = run(&dir, &mut test)?;
	assert!(count > 0, "no test files in {}", dir.display());

	Ok(())
}
