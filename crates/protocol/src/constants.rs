use std::time::Duration;

/// Directory under the user's home holding DocWalrus state.
pub const STATE_DIR_NAME: &str = ".docwalrus";

/// File name of the persisted wallet authorization record.
pub const WALLET_FILE_NAME: &str = "wallet.json";

/// Maximum age of an authorization record before it must be renewed.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// How far in the future an authorization timestamp may lie before the
/// record is treated as forged or written under a wrong clock.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// How long the handshake listener waits for the browser callback.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Time the listener stays open after a successful callback so the
/// confirmation page finishes serving.
pub const CALLBACK_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Upper bound for launching the user's browser.
pub const BROWSER_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Route the browser-hosted signer redirects to.
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Remote page hosting the wallet connect flow.
pub const DEFAULT_CONNECT_URL: &str = "https://docwalrus.vercel.app/get-started";

/// Walrus publisher endpoint (testnet).
pub const DEFAULT_PUBLISHER_URL: &str = "https://publisher.walrus-testnet.walrus.space/v1/blobs";

/// Walrus aggregator endpoint (testnet).
pub const DEFAULT_AGGREGATOR_URL: &str = "https://aggregator.walrus-testnet.walrus.space/v1/api";

/// Number of storage epochs purchased per blob.
pub const DEFAULT_EPOCHS: u32 = 1;

/// Sui full node JSON-RPC endpoint.
pub const DEFAULT_SUI_ENDPOINT: &str = "https://fullnode.mainnet.sui.io:443";

/// Gas budget (in MIST) for the manifest transaction.
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;

/// Timeout for a single blob upload.
///
/// Uploads are sequential, so this also bounds how long one slow file can
/// stall the whole publish pass.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for ledger JSON-RPC calls.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Storage provider tag embedded in the anchored manifest.
pub const STORAGE_PROVIDER: &str = "walrus";
