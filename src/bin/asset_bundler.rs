use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use asset_bundler::{
    bundle_fs::FS,
    commands::{
        cat::cat_file, extract::extract_files, list::list_files, pack::pack,
        verify::verify_bundle,
    },
    hasher::SecretKey,
    packer::PackConfig,
    VERBOSE,
};
use clap::{Args, Parser, Subcommand};
use glob::Pattern;

/// Where the secret for detail file digests comes from
#[derive(Debug, Args)]
struct KeyArgs {
    /// Secret key as hex
    #[arg(long, env = "ASSET_BUNDLE_KEY", hide_env_values = true)]
    key_hex: Option<String>,

    /// File holding the raw secret key bytes, takes precedence over --key-hex
    #[arg(long)]
    key_file: Option<PathBuf>,
}

impl KeyArgs {
    fn load(&self) -> Result<Option<SecretKey>> {
        match (&self.key_hex, &self.key_file) {
            (_, Some(path)) => SecretKey::from_file(path).map(Some),
            (Some(hex_key), None) => SecretKey::from_hex(hex_key).map(Some),
            (None, None) => Ok(None),
        }
    }
}

/// Bundle and manifest to read from
#[derive(Debug, Args)]
struct BundleArgs {
    /// Path to the bundle file
    #[arg(long, default_value = "erc.cb")]
    bundle: PathBuf,

    /// Path to the manifest file
    #[arg(long, default_value = "erc.json")]
    manifest: PathBuf,
}

impl BundleArgs {
    fn open(&self) -> Result<FS> {
        FS::open(&self.manifest, &self.bundle).context("Failed to open bundle")
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pack an asset folder into a bundle and manifest
    Pack {
        /// Folder of assets to pack
        #[arg(long, default_value = "./assets/")]
        assets: PathBuf,

        #[command(flatten)]
        output: BundleArgs,

        #[command(flatten)]
        key: KeyArgs,
    },
    /// List files in a bundle
    List {
        #[command(flatten)]
        input: BundleArgs,

        /// Glob patterns to filter the list of files
        #[clap(default_value = "**")]
        #[arg(num_args = 1..)]
        globs: Vec<Pattern>,
    },
    /// Extract a single file to stdout
    Cat {
        #[command(flatten)]
        input: BundleArgs,

        /// Path to the file to extract
        path: String,
    },
    /// Extract matched files to a folder
    Extract {
        #[command(flatten)]
        input: BundleArgs,

        /// Path to the folder to output the extracted files
        output_folder: PathBuf,

        /// Glob patterns to filter the list of files
        #[clap(default_value = "**")]
        #[arg(num_args = 1..)]
        globs: Vec<Pattern>,
    },
    /// Check a bundle against its manifest
    Verify {
        #[command(flatten)]
        input: BundleArgs,

        #[command(flatten)]
        key: KeyArgs,
    },
}

/// Packs a folder of game assets into a single bundle file plus a JSON manifest of offsets and
/// digests, and reads bundles back.
#[derive(Parser, Debug)]
#[command(name = "asset_bundler")]
#[clap(version)]
struct Cli {
    /// Print per-file progress and skipped detail files
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    VERBOSE.set(cli.verbose).unwrap();

    match cli.command {
        Command::Pack {
            assets,
            output,
            key,
        } => {
            let Some(key) = key.load().context("Failed to load secret key")? else {
                bail!(
                    "A secret key is required: pass --key-hex or --key-file, \
                     or set ASSET_BUNDLE_KEY"
                );
            };
            let config = PackConfig {
                asset_root: assets,
                bundle_path: output.bundle,
                manifest_path: output.manifest,
                key,
            };
            pack(&config).context("Pack command failed")?
        }
        Command::List { input, globs } => {
            list_files(&input.open()?, &globs).context("List command failed")?
        }
        Command::Cat { input, path } => {
            cat_file(&input.open()?, &path).context("Cat command failed")?
        }
        Command::Extract {
            input,
            output_folder,
            globs,
        } => {
            extract_files(&input.open()?, &globs, &output_folder)
                .context("Extract command failed")?;
        }
        Command::Verify { input, key } => {
            let key = key.load().context("Failed to load secret key")?;
            verify_bundle(&input.open()?, key.as_ref()).context("Verify command failed")?
        }
    }

    Ok(())
}
