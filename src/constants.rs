//! External protocol registries
//!
//! Object and package ids of the yield sources the markets are built on.
//! Everything here is read-only after first use, so concurrent readers need
//! no synchronisation. A coin type missing from a per-coin table means this
//! registry is out of date.
//!
//! Covered integrations:
//! - Scallop (market coins + x-oracle)
//! - Haedal (haSUI, haWAL)
//! - Volo (vSUI)
//! - Aftermath (afSUI)
//! - AlphaFi (stSUI)
//! - SpringSui LSTs
//! - Winter / Blizzard (WAL LSTs)
//! - Bucket (sBUCK)
//! - mStable (mUSD)

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::str::FromStr;

use crate::ptb::{ObjectId, TypeTag};

// ============================================
// SUI SYSTEM
// ============================================

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";
pub const SUI_SYSTEM_STATE_ID: ObjectId = ObjectId::from_u8(5);
pub const CLOCK_ID: ObjectId = ObjectId::from_u8(6);

/// Canonical form of a Move type string (full-width addresses), or the
/// trimmed input if it does not parse
pub fn normalize_type(type_str: &str) -> String {
    TypeTag::from_str(type_str)
        .map(|t| t.to_string())
        .unwrap_or_else(|_| type_str.trim().to_string())
}

pub fn is_sui(coin_type: &str) -> bool {
    normalize_type(coin_type) == normalize_type(SUI_COIN_TYPE)
}

// ============================================
// COIN TYPES
// ============================================

pub const HASUI_COIN_TYPE: &str =
    "0xbde4ba4c2e274a60ce15c1cfff9e5c42e41654ac8b6d906a57efa4bd3c29f47d::hasui::HASUI";
pub const HAWAL_COIN_TYPE: &str =
    "0x8b4d553839b219c3fd47608a0cc3d5fcc572cb25d41b7df3833208586a8d2470::hawal::HAWAL";
pub const VSUI_COIN_TYPE: &str =
    "0x549e8b69270defbfafd4f94e17ec44cdbdd99820b33bda2278dea3b9a32d3f55::cert::CERT";
pub const AFSUI_COIN_TYPE: &str =
    "0xf325ce1300e8dac124071d3152c5c5ee6174914f8bc2161e88329cf579246efc::afsui::AFSUI";
pub const STSUI_COIN_TYPE: &str =
    "0xd1b72982e40348d069bb1ff701e634c117bb5f741f44dff91e472d3b01461e55::stsui::STSUI";
pub const SBUCK_COIN_TYPE: &str =
    "0x1798f84ee72176114ddbf5525a6d964c5f8ea1b3738d08d50d0d3de4cf584884::sbuck::SBUCK";
pub const MUSD_COIN_TYPE: &str =
    "0xe44df51c0b21a27ab915fa1fe2ca610cd3eaa6d9666fe5e62b988bf7f0bd8722::musd::MUSD";

pub const SSUI_SPRING_COIN_TYPE: &str =
    "0x83556891f4a0f233ce7b05cfe7f957d4020492a34f5405b2cb9377d060bef4bf::spring_sui::SPRING_SUI";
pub const MSUI_COIN_TYPE: &str =
    "0x922d15d7f55c13fd790f6e54397470ec592caa2b508df292a2e8553f3d3b274f::msui::MSUI";
pub const WWAL_COIN_TYPE: &str =
    "0xb1b0650a8862e30e3f604fd6c5838bc25464b8d3d827fbd58af7cb9685b832bf::wwal::WWAL";
pub const PWAL_COIN_TYPE: &str =
    "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::pwal::PWAL";

pub const SCALLOP_SSUI_COIN_TYPE: &str =
    "0xaafc4f740de0dd0dde642a31148fb94517087052f19afb0f7bed1dc41a50c77b::scallop_sui::SCALLOP_SUI";
pub const SCALLOP_SUSDC_COIN_TYPE: &str =
    "0x854950aa624b1df59fe64e630b2ba7c550642e9342267a33061d59fb31582da5::scallop_usdc::SCALLOP_USDC";
pub const SCALLOP_SSCA_COIN_TYPE: &str =
    "0x5ca17430c1d046fae9edeaa8fd76c7b4193a00d764a0ecfa9418d733ad27bc1e::scallop_sca::SCALLOP_SCA";
pub const SCALLOP_SDEEP_COIN_TYPE: &str =
    "0xeb7a05a3224837c5e5503575aed0be73c091d1ce5e43aa3c3e716e0ae614608f::scallop_deep::SCALLOP_DEEP";
pub const SCALLOP_SWAL_COIN_TYPE: &str =
    "0x622345b3f80ea5947567760eec7b9639d0582adcfd6ab9fccb85437aeda7c0d0::scallop_wal::SCALLOP_WAL";

pub const USDC_COIN_TYPE: &str =
    "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";
pub const SCA_COIN_TYPE: &str =
    "0x7016aae72cfc67f2fadf55769c0a7dd54291a583b63051a5ed71081cce836ac6::sca::SCA";
pub const DEEP_COIN_TYPE: &str =
    "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP";
pub const WAL_COIN_TYPE: &str =
    "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL";

// ============================================
// PROTOCOL OBJECTS
// ============================================

#[derive(Debug, Clone, Copy)]
pub struct ScallopConstants {
    pub protocol_package: &'static str,
    pub version: &'static str,
    pub market: &'static str,
    pub x_oracle: &'static str,
}

pub const SCALLOP: ScallopConstants = ScallopConstants {
    protocol_package: "0x83bbe0b3985c5e3857803e2678899b03f3c4a31be75006ab03faf268c014ce41",
    version: "0x07871c4b3c847a0f674510d4978d5cf6f960452795e8ff6f189fd2088a3f6ac7",
    market: "0xa757975255146dc9686aa823b7838b507f315d704f428cbadad2f4ea061939d9",
    x_oracle: "0x93d5bf0936b71eb27255941e532fac33b5a5c7759e377b4923af0a1359ad494f",
};

#[derive(Debug, Clone, Copy)]
pub struct HaedalConstants {
    pub package: &'static str,
    pub staking: &'static str,
    pub walrus_package: &'static str,
    pub walrus_staking: &'static str,
    pub walrus_system: &'static str,
}

pub const HAEDAL: HaedalConstants = HaedalConstants {
    package: "0x3f45767c1aa95b25422f675800f02d8a813ec793a00b60667d071a77ba7178a2",
    staking: "0x47b224762220393057ebf4f70501b6e657c3e56684737568439a04f80849b2ca",
    walrus_package: "0x8b4d553839b219c3fd47608a0cc3d5fcc572cb25d41b7df3833208586a8d2470",
    walrus_staking: "0x9b4e41ae50b2b5fc8a4ba9b7b9bd2ae8a1d0e4b9e5eb4b5dd25c7da2c2dcb9d2",
    walrus_system: "0x2134d52768ea07e8c43570ef975eb3e4c27a39fa6396bef985b5abc58d03ddd2",
};

#[derive(Debug, Clone, Copy)]
pub struct VoloConstants {
    pub package: &'static str,
    pub native_pool: &'static str,
    pub metadata: &'static str,
}

pub const VOLO: VoloConstants = VoloConstants {
    package: "0x68d22cf8bdbcd11ecba1e094922873e4080d4d11133e2443fddda0bfd11dae20",
    native_pool: "0x7fa2faa111b8c65bea48a23049bfd81ca8f971a262d981dcd9a17c3825cb5baf",
    metadata: "0x680cd26af32b2bde8d3361e804c53ec1d1cfe24c7f039eb7f549e8dfde389a60",
};

#[derive(Debug, Clone, Copy)]
pub struct AftermathConstants {
    pub package: &'static str,
    pub staked_sui_vault: &'static str,
    pub safe: &'static str,
    pub referral_vault: &'static str,
    pub validator: &'static str,
}

pub const AFTERMATH: AftermathConstants = AftermathConstants {
    package: "0x7f6ce7ade63857c4fd16ef7783fed2dfc4d7fb7e40615abdb653030b76aef0c6",
    staked_sui_vault: "0x2f8f6d5da7f13ea37daa397724280483ed062769813b6f31e9788e59cc88994d",
    safe: "0xeb685899830dd5837b47007809c76d91a098d52aabbf61e8ac467c59e5cc4610",
    referral_vault: "0x4ce9a19b594599536c53edb25d22532f82f18038dc8ef618afd00fbbfb9845ef",
    validator: "0xd30018ec3f5ff1a3c75656abf927a87d7f0529e6dc89c7ddd1bd27ecb05e3db2",
};

#[derive(Debug, Clone, Copy)]
pub struct AlphaFiConstants {
    pub package: &'static str,
    pub liquid_staking_info: &'static str,
}

pub const ALPHAFI: AlphaFiConstants = AlphaFiConstants {
    package: "0x059f94b85c07eb74d2847f8255d8cc0a67c9a8dcc039eabf9f8b9e23a0de2700",
    liquid_staking_info: "0x1adb343ab351458e151bc392fbf1558b3332467f23bda45ae67cd355a57fd5f5",
};

#[derive(Debug, Clone, Copy)]
pub struct SpringSuiConstants {
    pub package: &'static str,
}

pub const SPRING_SUI: SpringSuiConstants = SpringSuiConstants {
    package: "0x82e6f4f75441eae97d2d5850f41a09d28c7b64a05b067d37748d471f43aaf3f7",
};

#[derive(Debug, Clone, Copy)]
pub struct WinterConstants {
    pub package: &'static str,
    pub walrus_staking: &'static str,
}

pub const WINTER: WinterConstants = WinterConstants {
    package: "0x29ba7f7bc53e776f27a6d1289555ded2f407b4b1a799224f06b26addbcd1c33d",
    walrus_staking: "0x10b9d30c28448939ce6c4d6c6e0ffce4a7f8a4ada8248bdad09ef8b70e4a3904",
};

#[derive(Debug, Clone, Copy)]
pub struct BucketConstants {
    pub package: &'static str,
    pub flask: &'static str,
}

pub const BUCKET: BucketConstants = BucketConstants {
    package: "0x0b6b5d0d8b4d6c7bd1f0a1d1e0f5f1bbd1f4d3bdbb12b4a3f9cc8c4b3fbc86b5",
    flask: "0xc6ecc9731e15d182bc0a46ebe1754a779a4bfb165c201102ad51a36838a1a7b8",
};

#[derive(Debug, Clone, Copy)]
pub struct MStableConstants {
    pub package: &'static str,
    pub vault: &'static str,
}

pub const MSTABLE: MStableConstants = MStableConstants {
    package: "0x8e9aa615cd18d263cfea43d68e2519a2de2d39075756a05f67ae6cee2794ff06",
    vault: "0x3062285974a5e517c88cf3395923aac788dce74f3640029a01e25d76c4e76f5d",
};

// ============================================
// PER-COIN TABLES
// ============================================

lazy_static! {
    /// SpringSui LST coin type -> its `LiquidStakingInfo` object
    static ref SPRING_SUI_LST_INFO: HashMap<String, &'static str> = {
        let mut m = HashMap::new();
        m.insert(
            normalize_type(SSUI_SPRING_COIN_TYPE),
            "0x15eda7330c8f99c30e430b4d82fd7ab2af3ead4ae17046fcb224aa9bad394f6b",
        );
        m.insert(
            normalize_type(MSUI_COIN_TYPE),
            "0x985dd33bc2a8b5390f2c30a18d32e9f63294cb1d1ea6a12cbbbed7b5ad32c1f2",
        );
        m
    };

    /// Winter LST coin type -> its Blizzard staking object
    static ref BLIZZARD_STAKING: HashMap<String, &'static str> = {
        let mut m = HashMap::new();
        m.insert(
            normalize_type(WWAL_COIN_TYPE),
            "0xccf034c98bee5ac3e8a0e1dc47dd1293ff39ffed51e0a1b5e3f03ec5c50b4e98",
        );
        m.insert(
            normalize_type(PWAL_COIN_TYPE),
            "0x2d9ceb5c1d3f6e4d2c92e2a64f15c66d2a9e8b8d65a13dd89bd4ea6c4d9a3d5a",
        );
        m
    };

    /// Scallop market coin type -> underlying coin type
    static ref SCALLOP_MARKET_COINS: HashMap<String, &'static str> = {
        let mut m = HashMap::new();
        m.insert(normalize_type(SCALLOP_SSUI_COIN_TYPE), SUI_COIN_TYPE);
        m.insert(normalize_type(SCALLOP_SUSDC_COIN_TYPE), USDC_COIN_TYPE);
        m.insert(normalize_type(SCALLOP_SSCA_COIN_TYPE), SCA_COIN_TYPE);
        m.insert(normalize_type(SCALLOP_SDEEP_COIN_TYPE), DEEP_COIN_TYPE);
        m.insert(normalize_type(SCALLOP_SWAL_COIN_TYPE), WAL_COIN_TYPE);
        m
    };
}

pub fn spring_sui_lst_info(coin_type: &str) -> Option<&'static str> {
    SPRING_SUI_LST_INFO.get(&normalize_type(coin_type)).copied()
}

pub fn blizzard_staking(coin_type: &str) -> Option<&'static str> {
    BLIZZARD_STAKING.get(&normalize_type(coin_type)).copied()
}

/// Underlying coin of a Scallop market coin
pub fn scallop_underlying(coin_type: &str) -> Option<&'static str> {
    SCALLOP_MARKET_COINS.get(&normalize_type(coin_type)).copied()
}

pub fn scallop_coin_types() -> Vec<String> {
    let mut types: Vec<String> = SCALLOP_MARKET_COINS.keys().cloned().collect();
    types.sort();
    types
}
