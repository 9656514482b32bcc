use image::error::ImageError;

use octree_quant::Quantizer;
use octree_quant::DEFAULT_MAX_DEPTH;

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Parses an optional numeric argument, exiting with status 2 on garbage.
fn numeric_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str) -> Option<T> {
	matches.value_of(name).map(|v| match v.parse() {
		Ok(n) => n,
		Err(_) => error_exit(&format!("Non-numeric value for {}", name), 2)
	})
}

/// `clap`-based CLI for quantizing images with an octree.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	env_logger::init();

	let clap_matches = clap::App::new("octree_quant")
		.version("0.1.0")
		.author("vkcz")
		.about("Reduces an image to a small palette using octree color quantization.")
		.arg_from_usage("-d, --depth=[N] 'Octree depth, 1 to 6; defaults to 5'")
		.arg_from_usage("-p, --prune=[N] 'Depth to prune the tree to, 2 up to (not including) --depth'")
		.arg_from_usage("-c, --colors=[N] 'Prune progressively until at most N colors remain'")
		.arg_from_usage("<INPUT> 'Path to input file'")
		.arg_from_usage("[OUTPUT] 'Path to output file; defaults to INPUT with a modified file extension'")
		.get_matches();

	let input_path = match clap_matches.value_of("INPUT") {
		Some(p) => p,
		None => error_exit("No input file given", 2)
	};
	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10)
			};
			error_exit(msg, code)
		}
	}.into_rgba8();

	let depth = numeric_arg(&clap_matches, "depth").unwrap_or(DEFAULT_MAX_DEPTH);
	let mut quantizer = match Quantizer::from_image(&source, depth) {
		Ok(q) => q,
		Err(e) => error_exit(&e.to_string(), 2)
	};
	log::info!("{} colors before reduction", quantizer.palette().len());

	if let Some(prune) = numeric_arg::<u8>(&clap_matches, "prune") {
		if let Err(e) = quantizer.reduce_to_depth(prune) {
			error_exit(&e.to_string(), 2)
		}
	}
	if let Some(colors) = numeric_arg::<usize>(&clap_matches, "colors") {
		match quantizer.reduce_to_colors(colors) {
			Ok(n) if n > colors => log::warn!("could only reduce to {} colors", n),
			Ok(_) => (),
			Err(e) => error_exit(&e.to_string(), 2)
		}
	}
	log::info!(
		"{} colors in generated palette at depth {}",
		quantizer.palette().len(), quantizer.depth()
	);

	let default_output = match input_path.rsplitn(2, '.').last() {
		Some(stem) => stem.to_string() + ".quant.png",
		None => error_exit("Invalid input path", 2)
	};
	let output = quantizer.to_image(&source);
	match output.save(clap_matches.value_of("OUTPUT").unwrap_or(&default_output)) {
		Ok(_) => (),
		Err(_) => error_exit("Could not save output", 3)
	}
}
