// Console walkthrough for the signature verification demo

use anyhow::Result;

use sighax_sim::rsa::{
    forge_lenient_signature, initialize, sign, verify_lenient, verify_strict, DigestAlgorithm,
    KeySource, VerificationResult,
};

fn print_result(label: &str, result: &VerificationResult) {
    println!("== {} ==", label);
    for step in &result.trail {
        let tag = if step.passed { " ok " } else { "FAIL" };
        println!("  [{}] {}", tag, step.title);
        println!("         {}", step.detail);
    }
    let verdict = if result.accepted { "ACCEPTED" } else { "REJECTED" };
    println!("  => {}", verdict);
    println!();
}

fn main() -> Result<()> {
    let algorithm = DigestAlgorithm::Sha256;
    let keypair = initialize(KeySource::Fixed)?;
    println!(
        "Demo keypair ready: RSA-{}, e = {}\n",
        keypair.bit_length(),
        keypair.public_key.e
    );

    // a properly signed image passes the strict verifier
    let trusted = b"trusted firmware image";
    let signature = sign(trusted, &keypair, algorithm)?;
    let result = verify_strict(trusted, &signature, &keypair.public_key, algorithm)?;
    print_result("Legitimate signature, strict verifier", &result);

    // forge a signature for a malicious image without the private key
    let evil = b"malicious firmware image";
    let evil_digest = algorithm.hash(evil);
    println!(
        "Forging a signature for digest {}\n",
        hex::encode(&evil_digest)
    );
    let forged = forge_lenient_signature(&evil_digest, algorithm, &keypair.public_key)?;

    let lenient = verify_lenient(evil, &forged, &keypair.public_key, algorithm)?;
    print_result("Forged signature, lenient verifier", &lenient);

    let strict = verify_strict(evil, &forged, &keypair.public_key, algorithm)?;
    print_result("Forged signature, strict verifier", &strict);

    Ok(())
}
