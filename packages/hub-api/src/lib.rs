//! Request and response types for the biolink hub and activity APIs.
//!
//! # Endpoints covered
//!
//! | Method | Path | Type |
//! |--------|------|------|
//! | GET | `/asset-profile/{address}/{type}/` | → [`biolink::AssetProfile`] |
//! | GET | `/asset-profile/{address}/nft/` | [`DetailQuery`] → [`NftResponse`] |
//! | GET | `/asset-profile/{address}/gitcoin-donation/` | [`DetailQuery`] → [`GitcoinResponse`] |
//! | GET | `/asset-profile/{address}/poap/` | [`DetailQuery`] → [`FootprintResponse`] |
//! | GET | `/{file_id}` | → file JSON |
//! | PUT | `/` | [`PutFilesRequest`] |
//! | POST | `{activity}/poap/claim` | [`ClaimRequest`] → [`ClaimResponse`] |

pub mod claim;
pub mod detail;
pub mod file;

pub use claim::{ClaimData, ClaimRequest, ClaimResponse, TxStatus};
pub use detail::{
    DetailQuery, DetailResponse, DonationDetail, DonationTx, FootprintDetail, FootprintResponse,
    GitcoinResponse, GrantInfo, NftDetail, NftResponse, NftTrait, PoapEvent,
};
pub use file::{new_index_file, PutFilesRequest, FILE_VERSION};
