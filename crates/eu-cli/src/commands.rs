use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};

use eu_register::{
    extend_array_values, find_record, Payload, PayloadBuilder, ProfileSchema, RegisterConfig,
};
use eu_utils::{
    calculate_md5sum, does_lib_replicate_exist, find_lib_replicates, Alias, ReplicateFilter,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out)
}

fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Md5sum(args) => cmd_md5sum(args, format, out),
        Command::CleanAlias(args) => emit_str(&Alias::from(args.alias).sanitized().into_inner(), format, out),
        Command::StripPrefix(args) => emit_str(Alias::from(args.alias).name(), format, out),
        Command::Replicates(args) => cmd_replicates(args, format, out),
        Command::Register(args) => cmd_register(args, out),
    }
}

fn emit_str(value: &str, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{value}")?,
        OutputFormat::Json => writeln!(out, "{}", Value::from(value))?,
    }
    Ok(())
}

fn cmd_md5sum(args: Md5sumArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let mut sums = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let digest = calculate_md5sum(path)?;
        match format {
            OutputFormat::Text => writeln!(out, "{}  {}", digest, path.display())?,
            OutputFormat::Json => sums.push(json!({ "path": path, "md5sum": digest })),
        }
    }
    if let OutputFormat::Json = format {
        writeln!(out, "{}", Value::Array(sums))?;
    }
    Ok(())
}

fn cmd_replicates(args: ReplicatesArgs, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let replicates: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    let filter = ReplicateFilter {
        biological: args.bio,
        technical: args.tech,
    };
    match format {
        OutputFormat::Json => {
            let uuids = does_lib_replicate_exist(&replicates, &args.library, filter)?;
            writeln!(out, "{}", json!(uuids))?;
        }
        OutputFormat::Text => {
            let matches = find_lib_replicates(&replicates, &args.library, filter)?;
            if matches.is_empty() {
                eprintln!("No replicates for library {}.", args.library.yellow());
            }
            for record in matches {
                writeln!(
                    out,
                    "{}\tbio={}\ttech={}\t{}",
                    scalar_or_dash(record.get("uuid")),
                    scalar_or_dash(record.get("biological_replicate_number")),
                    scalar_or_dash(record.get("technical_replicate_number")),
                    scalar_or_dash(record.pointer("/aliases/0")),
                )?;
            }
        }
    }
    Ok(())
}

fn scalar_or_dash(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "-".into(),
    }
}

fn cmd_register(args: RegisterArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => RegisterConfig::from_path(path)?,
        None => RegisterConfig::default(),
    }
    .with_env_overrides(|key| std::env::var(key).ok());

    let schema = ProfileSchema::from_path(&args.schema)?;
    let builder = PayloadBuilder::new(&args.profile, schema, config);
    let reader = open_sheet(args.infile.as_deref())?;

    let payloads = if args.patch {
        let mut payloads = builder.patch_payloads(reader)?;
        if let Some(path) = args.existing.as_ref().filter(|_| !args.overwrite_array_values) {
            let records = load_records(path)?;
            extend_from_records(&mut payloads, &records, &builder.config().identifier_key);
        }
        payloads
    } else {
        builder.post_payloads(reader)?
    };

    for payload in &payloads {
        writeln!(out, "{}", serde_json::to_string(payload)?)?;
    }
    eprintln!(
        "{} {} {} payload(s) for profile {}",
        "✓".green().bold(),
        payloads.len(),
        if args.patch { "PATCH" } else { "POST" },
        args.profile.cyan(),
    );
    Ok(())
}

fn open_sheet(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    Ok(match path {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    })
}

fn load_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match serde_json::from_str::<Value>(&text).with_context(|| format!("parsing {}", path.display()))? {
        Value::Array(records) => Ok(records),
        _ => bail!("{} must contain a JSON array of records", path.display()),
    }
}

fn extend_from_records(payloads: &mut [Payload], records: &[Value], identifier_key: &str) {
    for payload in payloads {
        let Some(id) = payload.get(identifier_key).and_then(Value::as_str) else { continue };
        match find_record(records, id) {
            Some(record) => extend_array_values(record, &mut payload.fields),
            None => tracing::warn!(record = id, row = payload.row, "no current record; array values sent as-is"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const SCHEMA: &str = r#"{"properties": {
        "aliases": {"type": "array", "items": {"type": "string"}},
        "lab": {"type": "string"},
        "passage_number": {"type": "integer"}
    }}"#;

    #[test]
    fn clean_alias_text_and_json() {
        assert_eq!(run_args(&["eu", "clean-alias", r"lab:a/b\c"]).unwrap(), "lab:a_b_c\n");
        assert_eq!(
            run_args(&["eu", "--format", "json", "clean-alias", "lab:a/b"]).unwrap(),
            "\"lab:a_b\"\n"
        );
    }

    #[test]
    fn strip_prefix() {
        assert_eq!(run_args(&["eu", "strip-prefix", "michael-snyder:B-167"]).unwrap(), "B-167\n");
    }

    #[test]
    fn md5sum_lists_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "empty.txt", "");
        let out = run_args(&["eu", "md5sum", path.to_str().unwrap()]).unwrap();
        assert_eq!(out, format!("d41d8cd98f00b204e9800998ecf8427e  {}\n", path.display()));
    }

    #[test]
    fn md5sum_missing_file_fails() {
        assert!(run_args(&["eu", "md5sum", "/definitely/not/here"]).is_err());
    }

    #[test]
    fn replicates_json_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "reps.json",
            r#"[{"uuid": "u-1", "library": {"accession": "ENCLB1"}, "aliases": ["lab:r1"],
                 "biological_replicate_number": 1, "technical_replicate_number": 1}]"#,
        );
        let p = path.to_str().unwrap();
        assert_eq!(
            run_args(&["eu", "--format", "json", "replicates", p, "-l", "ENCLB1"]).unwrap(),
            "[\"u-1\"]\n"
        );
        assert_eq!(
            run_args(&["eu", "replicates", p, "-l", "ENCLB1"]).unwrap(),
            "u-1\tbio=1\ttech=1\tlab:r1\n"
        );
        assert_eq!(run_args(&["eu", "replicates", p, "-l", "ENCLB2"]).unwrap(), "");
    }

    #[test]
    fn replicates_text_prints_loosely_typed_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "reps.json",
            r#"[{"uuid": "u-1", "library": {"accession": "ENCLB1"}, "biological_replicate_number": "1"}]"#,
        );
        let p = path.to_str().unwrap();
        assert_eq!(
            run_args(&["eu", "--format", "json", "replicates", p, "-l", "ENCLB1"]).unwrap(),
            "[\"u-1\"]\n"
        );
        assert_eq!(
            run_args(&["eu", "replicates", p, "-l", "ENCLB1"]).unwrap(),
            "u-1\tbio=1\ttech=-\t-\n"
        );
    }

    #[test]
    fn replicates_text_skips_other_library_with_same_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "reps.json",
            r#"[{"uuid": "u-1", "library": {"accession": "ENCLB1"}, "aliases": ["lab:r1"]},
                {"uuid": "u-1", "library": {"accession": "ENCLB2"}, "aliases": ["lab:r2"]}]"#,
        );
        let out = run_args(&["eu", "replicates", path.to_str().unwrap(), "-l", "ENCLB1"]).unwrap();
        assert_eq!(out, "u-1\tbio=-\ttech=-\tlab:r1\n");
    }

    #[test]
    fn register_post_emits_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.json", SCHEMA);
        let sheet = write(&dir, "rows.tsv", "aliases\tpassage_number\nlab:a\t1\nlab:b\t2\n");
        let out = run_args(&[
            "eu", "register", "-p", "biosample",
            "-s", schema.to_str().unwrap(),
            "-i", sheet.to_str().unwrap(),
        ])
        .unwrap();
        let lines: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["passage_number"], 2);
        assert_eq!(lines[0]["_profile"], "biosample");
    }

    #[test]
    fn register_patch_extends_existing_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.json", SCHEMA);
        let sheet = write(&dir, "rows.tsv", "record_id\taliases\nENCBS001AAA\tlab:b,lab:c\n");
        let existing = write(
            &dir,
            "current.json",
            r#"[{"accession": "ENCBS001AAA", "aliases": ["lab:a", "lab:b"]}]"#,
        );
        let out = run_args(&[
            "eu", "register", "-p", "biosample",
            "-s", schema.to_str().unwrap(),
            "-i", sheet.to_str().unwrap(),
            "--patch", "--existing", existing.to_str().unwrap(),
        ])
        .unwrap();
        let payload: Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(payload["_enc_id"], "ENCBS001AAA");
        assert_eq!(payload["aliases"], json!(["lab:a", "lab:b", "lab:c"]));
        assert!(payload.get("record_id").is_none());
    }

    #[test]
    fn register_unknown_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let schema = write(&dir, "schema.json", SCHEMA);
        let sheet = write(&dir, "rows.tsv", "colour\nred\n");
        let err = run_args(&[
            "eu", "register", "-p", "biosample",
            "-s", schema.to_str().unwrap(),
            "-i", sheet.to_str().unwrap(),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("colour"));
    }
}
