//! `sigil keygen` — Generate a signing keypair file.

use clap::Args;
use std::path::PathBuf;

use sigil_crypto::Keypair;

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the keypair file (a JSON array of 64 bytes).
    #[arg(short, long, default_value = "sigil-keypair.json")]
    pub out: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &KeygenArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            args.out.display()
        );
    }

    let keypair = Keypair::generate();
    keypair.save_to_file(&args.out)?;

    println!("Keypair written to {}", args.out.display());
    println!("  Signer: {}", keypair.signer_id());
    println!();
    println!("Fund this account before anchoring (devnet: solana airdrop).");
    Ok(())
}
