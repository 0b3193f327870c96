//! Command dispatch: wire the core services, run one command, map the
//! result to an exit code.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context as _, Result};
use tracing::warn;

use attest_core::format::{format_file_size, format_timestamp, truncate_hash};
use attest_core::{
    record_from_proof, DocumentController, DocumentRecord, DocumentStatus, FileLedgerNotary,
    InMemoryNotary, JsonFileStore, MemoryStore, NotarizeMetadata, NotaryBackend, NotaryService,
    StoreSpec, StoreWriter,
};

use super::args::{Cli, Command};
use crate::exit_codes;

const HASH_HEAD: usize = 14;
const HASH_TAIL: usize = 4;

pub async fn dispatch(cli: Cli) -> Result<i32> {
    let spec = match &cli.store {
        Some(raw) => StoreSpec::parse(raw)?,
        None => StoreSpec::File {
            dir: default_data_dir()?,
        },
    };

    let (writer, backend): (StoreWriter, Arc<dyn NotaryBackend>) = match &spec {
        StoreSpec::Memory => (
            StoreWriter::spawn(MemoryStore::new()),
            Arc::new(InMemoryNotary::new()),
        ),
        StoreSpec::File { dir } => (
            StoreWriter::spawn(JsonFileStore::new(dir)),
            Arc::new(FileLedgerNotary::new(dir)),
        ),
    };

    let notary = NotaryService::new(backend);
    if let Err(e) = notary.initialize().await {
        // Non-fatal here; commands that need the ledger fail with a typed
        // error of their own.
        warn!(error = %e, "notary initialization failed");
        eprintln!("warning: {e}");
    }
    let controller = DocumentController::new(notary, writer).await?;

    match cli.command {
        Command::Notarize {
            file,
            author,
            title,
            institution,
            pages,
        } => notarize(&controller, &file, author, title, institution, pages).await,
        Command::Verify { file } => verify(&controller, &file).await,
        Command::List { json } => list(&controller, json),
        Command::Show { id } => show(&controller, &id),
        Command::Rm { id } => rm(&controller, &id).await,
        Command::Clear { yes } => clear(&controller, yes).await,
        Command::Witness { id } => witness(&controller, &id).await,
    }
}

fn default_data_dir() -> Result<std::path::PathBuf> {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("attest"))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --store"))
}

async fn notarize(
    controller: &DocumentController,
    file: &Path,
    author: String,
    title: Option<String>,
    institution: Option<String>,
    pages: Option<u32>,
) -> Result<i32> {
    let path = file.to_string_lossy().to_string();
    let title = title.unwrap_or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.clone())
    });

    let mut metadata = NotarizeMetadata::new(title, author);
    if let Some(institution) = institution {
        metadata = metadata.with_institution(institution);
    }

    let proof = match controller.notarize_and_track(&path, &metadata).await {
        Ok(proof) => proof,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(exit_codes::ERROR);
        }
    };

    let mut record = record_from_proof(&path, &metadata, &proof)
        .await
        .context("failed to build the document record")?;
    if let Some(pages) = pages {
        record = record.with_page_count(pages);
    }
    controller.persist(record.clone()).await?;

    println!("Notarized {}", record.title);
    println!("  id:         {}", record.id);
    println!(
        "  hash:       {}",
        truncate_hash(&record.hash, HASH_HEAD, HASH_TAIL)
    );
    println!("  notarized:  {}", format_timestamp(record.timestamp));
    println!(
        "  proof:      {} ({} witnesses)",
        proof.notarization_id,
        proof.witnesses.len()
    );
    Ok(exit_codes::OK)
}

async fn verify(controller: &DocumentController, file: &Path) -> Result<i32> {
    let outcome = controller
        .verify_and_track(&file.to_string_lossy())
        .await;

    let presentation = outcome.status.presentation();
    println!(
        "{} {} - {}",
        presentation.icon, presentation.label, outcome.message
    );
    if let Some(document) = &outcome.document {
        println!(
            "  matches {} ({}, notarized {})",
            document.id,
            document.title,
            format_timestamp(document.timestamp)
        );
    }

    Ok(match outcome.status {
        DocumentStatus::Verified => exit_codes::OK,
        DocumentStatus::Unverified => exit_codes::UNVERIFIED,
        _ => exit_codes::ERROR,
    })
}

fn list(controller: &DocumentController, json: bool) -> Result<i32> {
    let documents = controller.documents();
    if json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(exit_codes::OK);
    }
    if documents.is_empty() {
        println!("no documents");
        return Ok(exit_codes::OK);
    }
    for record in &documents {
        let presentation = record.status.presentation();
        println!(
            "{}  {} {}  {} - {}  {}",
            record.id,
            presentation.icon,
            presentation.label,
            record.title,
            record.author,
            format_file_size(record.file_size),
        );
    }
    Ok(exit_codes::OK)
}

fn show(controller: &DocumentController, id: &str) -> Result<i32> {
    let Some(record) = controller.lookup(id) else {
        eprintln!("error: document not found: {id}");
        return Ok(exit_codes::NOT_FOUND);
    };
    print_record(&record);
    Ok(exit_codes::OK)
}

fn print_record(record: &DocumentRecord) {
    let presentation = record.status.presentation();
    println!("{}", record.title);
    println!("  id:          {}", record.id);
    println!("  author:      {}", record.author);
    if let Some(institution) = &record.institution {
        println!("  institution: {institution}");
    }
    println!("  status:      {} {}", presentation.icon, presentation.label);
    println!("  notarized:   {}", format_timestamp(record.timestamp));
    println!(
        "  hash:        {}",
        truncate_hash(&record.hash, HASH_HEAD, HASH_TAIL)
    );
    println!("  file:        {}", record.file_path);
    println!("  size:        {}", format_file_size(record.file_size));
    if let Some(pages) = record.page_count {
        println!("  pages:       {pages}");
    }
    if let Some(witnesses) = record.witnesses {
        println!("  witnesses:   {witnesses}");
    }
    if let Some(proof) = &record.proof {
        println!("  proof:       {}", proof.notarization_id);
        println!(
            "  merkle root: {}",
            truncate_hash(&proof.merkle_root, HASH_HEAD, HASH_TAIL)
        );
    }
}

async fn rm(controller: &DocumentController, id: &str) -> Result<i32> {
    controller.remove(id).await?;
    println!("removed {id}");
    Ok(exit_codes::OK)
}

async fn clear(controller: &DocumentController, yes: bool) -> Result<i32> {
    if !yes {
        eprintln!("error: clearing removes every record; pass --yes to confirm");
        return Ok(exit_codes::ERROR);
    }
    controller.clear().await?;
    println!("cleared");
    Ok(exit_codes::OK)
}

async fn witness(controller: &DocumentController, id: &str) -> Result<i32> {
    let Some(record) = controller.lookup(id) else {
        eprintln!("error: document not found: {id}");
        return Ok(exit_codes::NOT_FOUND);
    };
    let Some(proof) = &record.proof else {
        eprintln!("error: document {id} has no notarization proof");
        return Ok(exit_codes::ERROR);
    };

    match controller
        .notary()
        .request_witnesses(&proof.notarization_id)
        .await
    {
        Ok(()) => {
            println!("witness solicitation started for {}", proof.notarization_id);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(exit_codes::ERROR)
        }
    }
}
