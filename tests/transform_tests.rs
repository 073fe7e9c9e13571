use std::fs;

use fileprobe::transform::{
    CipherKind, Codec, KeyMaterial, Operation, TransformConfig, TransformJob, TransformService,
    NONCE_LEN, TransformStatus, compress, decompress, decrypt, encrypt,
};
use fileprobe::{ProbeError, analyze};

fn material(cipher: CipherKind) -> KeyMaterial {
    let key: Vec<u8> = (0..cipher.key_len() as u8).collect();
    let iv: Vec<u8> = (100..100 + cipher.iv_len() as u8).collect();
    KeyMaterial::new(cipher, key, iv).unwrap()
}

fn sample_text() -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog.\n".repeat(200)
}

const CIPHERS: [CipherKind; 3] = [
    CipherKind::Aes256Cfb,
    CipherKind::BlowfishCfb,
    CipherKind::ChaCha20Poly1305,
];

#[test]
fn test_encrypt_decrypt_each_cipher() {
    let plaintext = sample_text();
    for cipher in CIPHERS {
        let key = material(cipher);
        let sealed = encrypt(&key, &plaintext).unwrap();
        assert_ne!(sealed, plaintext, "{cipher}");
        assert_eq!(decrypt(&key, &sealed).unwrap(), plaintext, "{cipher}");
    }
}

#[test]
fn test_cfb_output_is_padded() {
    let plaintext = b"seventeen bytes!!";
    let aes = encrypt(&material(CipherKind::Aes256Cfb), plaintext).unwrap();
    assert_eq!(aes.len(), 32);
    let blowfish = encrypt(&material(CipherKind::BlowfishCfb), plaintext).unwrap();
    assert_eq!(blowfish.len(), 24);
    let chacha = encrypt(&material(CipherKind::ChaCha20Poly1305), plaintext).unwrap();
    assert_eq!(chacha.len(), NONCE_LEN + plaintext.len() + 16);
}

#[test]
fn test_empty_plaintext() {
    for cipher in CIPHERS {
        let key = material(cipher);
        let sealed = encrypt(&key, b"").unwrap();
        assert_eq!(decrypt(&key, &sealed).unwrap(), b"");
    }
}

#[test]
fn test_tampered_chacha_ciphertext_rejected() {
    let key = material(CipherKind::ChaCha20Poly1305);
    let mut sealed = encrypt(&key, b"attack at dawn").unwrap();
    sealed[NONCE_LEN] ^= 1;
    assert!(matches!(decrypt(&key, &sealed), Err(ProbeError::Decrypt(_))));
}

#[test]
fn test_ciphertext_looks_random() {
    let plaintext = sample_text();
    let plain_entropy = analyze(&plaintext).unwrap().entropy();
    let sealed = encrypt(&material(CipherKind::ChaCha20Poly1305), &plaintext).unwrap();
    let sealed_entropy = analyze(&sealed).unwrap().entropy();
    assert!(plain_entropy < 5.0);
    assert!(sealed_entropy > 7.5, "entropy {sealed_entropy}");
}

#[test]
fn test_codecs_round_trip() {
    let data = sample_text();
    for codec in [Codec::Deflate, Codec::Lzma] {
        let packed = compress(codec, &data).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(decompress(codec, &packed).unwrap(), data);
    }
}

#[test]
fn test_service_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    fs::write(&input, sample_text()).unwrap();
    let output = dir.path().join("out").join("notes.txt.compressed");

    let service = TransformService::new(TransformConfig::new(Operation::Compress(Codec::Deflate)));
    let outcomes = service.run(vec![TransformJob::new(&input, &output)]);

    assert_eq!(outcomes.len(), 1);
    let status = outcomes[0].result.as_ref().unwrap();
    assert!(matches!(status, TransformStatus::Written { bytes_out, .. } if *bytes_out > 0));
    let packed = fs::read(&output).unwrap();
    assert_eq!(decompress(Codec::Deflate, &packed).unwrap(), sample_text());
}

#[test]
fn test_service_skips_high_entropy_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let sealed = encrypt(&material(CipherKind::Aes256Cfb), &sample_text()).unwrap();
    let input = dir.path().join("blob.AES.enc");
    fs::write(&input, &sealed).unwrap();
    let output = dir.path().join("blob.AES.enc.compressed");

    let config = TransformConfig::new(Operation::Compress(Codec::Lzma)).skip_high_entropy(true);
    let status = TransformService::new(config)
        .run_job(&TransformJob::new(&input, &output))
        .unwrap();

    assert!(matches!(status, TransformStatus::Skipped { entropy } if entropy > 7.5));
    assert!(!output.exists());
}

#[test]
fn test_service_compresses_high_entropy_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let sealed = encrypt(&material(CipherKind::Aes256Cfb), &sample_text()).unwrap();
    let input = dir.path().join("blob.enc");
    fs::write(&input, &sealed).unwrap();
    let output = dir.path().join("blob.enc.compressed");

    let service = TransformService::new(TransformConfig::new(Operation::Compress(Codec::Deflate)));
    let status = service.run_job(&TransformJob::new(&input, &output)).unwrap();
    assert!(matches!(status, TransformStatus::Written { .. }));
    assert!(output.exists());
}

#[test]
fn test_service_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.txt");
    fs::write(&good, b"hello").unwrap();
    let key = material(CipherKind::BlowfishCfb);

    let service = TransformService::new(TransformConfig::new(Operation::Encrypt(key.clone())));
    let outcomes = service.run(vec![
        TransformJob::new(dir.path().join("missing.txt"), dir.path().join("missing.enc")),
        TransformJob::new(&good, dir.path().join("good.txt.Blowfish.enc")),
    ]);

    assert!(matches!(outcomes[0].result, Err(ProbeError::Io { .. })));
    assert!(outcomes[1].result.is_ok());
    let sealed = fs::read(dir.path().join("good.txt.Blowfish.enc")).unwrap();
    assert_eq!(decrypt(&key, &sealed).unwrap(), b"hello");
}

#[test]
fn test_wrong_key_fails_decrypt_service() {
    let key = material(CipherKind::ChaCha20Poly1305);
    let other = KeyMaterial::new(CipherKind::ChaCha20Poly1305, vec![9; 32], Vec::new()).unwrap();
    let sealed = encrypt(&key, b"payload").unwrap();
    let service = TransformService::new(TransformConfig::new(Operation::Decrypt(other)));
    assert!(matches!(service.apply(&sealed), Err(ProbeError::Decrypt(_))));
}

#[test]
fn test_batch_encryption_never_repeats_a_nonce() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.txt");
    let second = dir.path().join("b.txt");
    fs::write(&first, b"attack at dawn!!attack at dawn!!").unwrap();
    fs::write(&second, b"retreat at dusk!retreat at dusk!").unwrap();
    let key = material(CipherKind::ChaCha20Poly1305);

    let service = TransformService::new(TransformConfig::new(Operation::Encrypt(key.clone())));
    let outcomes = service.run(vec![
        TransformJob::new(&first, dir.path().join("a.enc")),
        TransformJob::new(&second, dir.path().join("b.enc")),
    ]);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    let sealed_a = fs::read(dir.path().join("a.enc")).unwrap();
    let sealed_b = fs::read(dir.path().join("b.enc")).unwrap();
    assert_ne!(sealed_a[..NONCE_LEN], sealed_b[..NONCE_LEN]);

    let xor = |x: &[u8], y: &[u8]| -> Vec<u8> { x.iter().zip(y).map(|(a, b)| a ^ b).collect() };
    let plain_xor = xor(&fs::read(&first).unwrap(), &fs::read(&second).unwrap());
    let body_xor = xor(&sealed_a[NONCE_LEN..], &sealed_b[NONCE_LEN..]);
    assert_ne!(body_xor[..plain_xor.len()], plain_xor[..]);

    assert_eq!(decrypt(&key, &sealed_b).unwrap(), fs::read(&second).unwrap());
}
