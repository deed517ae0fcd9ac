//! Implementation of the `render-shim render` command.

use crate::cli::RenderArgs;
use render_shim::error::{Result, ShimError};
use render_shim::{DocumentType, RenderOption, Renderer, RenderersConfig};
use std::io::{Read, Write};
use std::path::Path;

/// Marker for stdin/stdout in `--input` and `--output`.
const STDIO_MARKER: &str = "-";

/// Execute the `render-shim render` command.
pub fn cmd_render(config: RenderersConfig, args: RenderArgs) -> Result<()> {
    let doc_type: DocumentType = args.doc_type.parse()?;
    let extra_options = parse_options(&args.options)?;
    let input = read_input(&args.input)?;

    let renderer = Renderer::new(config);

    if args.output == STDIO_MARKER {
        let bytes = renderer.render(doc_type, &input, &extra_options)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&bytes)
            .and_then(|()| stdout.flush())
            .map_err(|e| ShimError::io("failed to write rendered output to stdout", e))?;
        return Ok(());
    }

    let output = Path::new(&args.output);
    let report = renderer.render_to_file(doc_type, &input, &extra_options, output, args.overwrite)?;

    println!(
        "Rendered {} to {} ({} bytes in {} ms)",
        doc_type,
        output.display(),
        report.bytes,
        report.duration.as_millis()
    );
    Ok(())
}

/// Parse `FLAG` / `FLAG=VALUE` arguments into options, preserving order.
pub(crate) fn parse_options(raw: &[String]) -> Result<Vec<RenderOption>> {
    raw.iter().map(|s| RenderOption::parse_cli(s)).collect()
}

fn read_input(source: &str) -> Result<Vec<u8>> {
    if source == STDIO_MARKER {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .map_err(|e| ShimError::io("failed to read input from stdin", e))?;
        return Ok(buf);
    }

    std::fs::read(source)
        .map_err(|e| ShimError::io(format!("failed to read input file '{}'", source), e))
}
