fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use docwalrus_anchor::types::{ExecutionState, ObjectResponse, TransactionBlockResponse};
    use docwalrus_anchor::ManifestMetadata;
    use docwalrus_protocol::{AnchorResult, AuthResult, AuthorizationRecord, Network};
    use docwalrus_walrus::ContentId;

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn load_fixture_text(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&load_fixture_text(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    /// Unwraps the `result` member of a JSON-RPC response fixture.
    fn rpc_result<T: serde::de::DeserializeOwned>(name: &str) -> T {
        let mut fixture = load_fixture(name);
        let result = fixture
            .get_mut("result")
            .map(serde_json::Value::take)
            .unwrap_or_else(|| panic!("{name} has no result"));
        serde_json::from_value(result).unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  Rust:    {reserialized}"
        );
    }

    // --- Wallet state ---

    #[test]
    fn fixture_wallet_record() {
        roundtrip_test::<AuthorizationRecord>("wallet_record.json");
    }

    #[test]
    fn legacy_wallet_record() {
        let record: AuthorizationRecord =
            serde_json::from_value(load_fixture("wallet_record_legacy.json")).unwrap();
        assert_eq!(record.network, Network::Mainnet);
        assert!(record.is_authorized());
        assert!(record.last_validated_at.is_none());

        // Rewritten records use the current field names.
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["network"], "mainnet");
        assert!(json.get("authorizedAt").is_some());
        assert!(json.get("lastConnected").is_none());
    }

    #[test]
    fn legacy_wallet_record_without_network() {
        let json = r#"{
            "address": "0xabc",
            "lastConnected": "2025-03-01T12:00:00.000Z"
        }"#;
        let record: AuthorizationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.network, Network::Mainnet, "missing network defaults to mainnet");
    }

    #[test]
    fn fixture_auth_result_failed() {
        roundtrip_test::<AuthResult>("auth_result_failed.json");
    }

    #[test]
    fn fixture_anchor_result() {
        roundtrip_test::<AnchorResult>("anchor_result.json");
    }

    // --- Walrus publisher ---

    #[test]
    fn fixture_walrus_newly_created() {
        let id = ContentId::from_body(&load_fixture_text("walrus_newly_created.json")).unwrap();
        assert_eq!(
            id,
            ContentId::Structured("M4hsZGQ1oCktdzegB6HnI6Mi28S2nqOPHxK-W7_4BUk".into())
        );
    }

    #[test]
    fn fixture_walrus_already_certified() {
        let id = ContentId::from_body(&load_fixture_text("walrus_already_certified.json")).unwrap();
        assert_eq!(
            id,
            ContentId::Structured("E0RWhNnVVqSbsvy7ET0d2mOOQYtmQsTwE0kRDUK2g3s".into())
        );
    }

    // --- Sui ledger ---

    #[test]
    fn fixture_site_metadata() {
        roundtrip_test::<ManifestMetadata>("site_metadata.json");
    }

    #[test]
    fn fixture_sui_execute_response() {
        let resp: TransactionBlockResponse = rpc_result("sui_execute_response.json");
        assert_eq!(resp.digest, "5oHrCZ8AKpYXwWk7Hnxs1DpkwTUe6MnpRhtgbEGxTzc4");

        let effects = resp.effects.expect("effects requested");
        assert_eq!(effects.status.status, ExecutionState::Success);
        assert_eq!(effects.created.len(), 1);
        assert_eq!(
            effects.created[0].reference.object_id,
            "0x5b1d0c6c8b0b4cf1f4e0dd9c0c73a8b8e6dcf0fbc16a8ad1c2f8bb6d8c7d7e01"
        );
    }

    #[test]
    fn fixture_sui_get_object_response() {
        let resp: ObjectResponse = rpc_result("sui_get_object_response.json");
        let content = resp.data.and_then(|d| d.content).expect("content requested");
        assert_eq!(content.data_type, "moveObject");
        assert_eq!(content.fields["name"], "Walrus Docs");

        // The metadata field is itself a serialized manifest.
        let raw = content.fields["metadata"].as_str().unwrap();
        let metadata: ManifestMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(metadata.storage_provider, "walrus");
        assert_eq!(metadata.files.len(), 1);
        assert_eq!(metadata.files[0].relative_path, "index.html");
    }
}
