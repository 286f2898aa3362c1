use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{from_value, json};

use crate::dao::{
    models::{DailyChallengeEntity, RoomEntity, StoredArtistEntity},
    room_store::{RoomMutation, RoomStore, RoomUpdateOutcome},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        ARTIST_POOL_DOC_ID, AllDocsResponse, CouchArtistPoolDocument, CouchDailyChallengeDocument,
        CouchRoomDocument, DAILY_CHALLENGE_DOC_ID, END_SUFFIX, ROOM_PREFIX, room_doc_id,
    },
};

/// How many revision conflicts a single atomic room update tolerates before
/// reporting a conflict to the caller.
const MAX_CAS_RETRIES: usize = 5;

/// CouchDB-backed [`RoomStore`].
///
/// Atomic room updates rely on CouchDB's MVCC: the document is re-read, the
/// mutation re-applied, and the PUT retried whenever the revision moved
/// underneath us.
#[derive(Clone)]
pub struct CouchRoomStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchRoomStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(user, pass)| (Arc::<str>::from(user), Arc::<str>::from(pass)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, self.database, path);
        let builder = self.client.request(method, url);
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = format!("{}/{}", self.base_url, self.database);
        let mut builder = self.client.get(&url);
        if let Some((ref user, ref pass)) = self.auth {
            builder = builder.basic_auth(user.as_ref(), Some(pass.as_ref()));
        }

        let response = builder
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseQuery {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let mut builder = self.client.put(&url);
                if let Some((ref user, ref pass)) = self.auth {
                    builder = builder.basic_auth(user.as_ref(), Some(pass.as_ref()));
                }
                let create =
                    builder
                        .send()
                        .await
                        .map_err(|source| CouchDaoError::DatabaseCreate {
                            database: database.clone(),
                            source,
                        })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::DecodeResponse {
                        path: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// PUT a document; `Ok(false)` signals a lost revision race.
    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<bool>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::CONFLICT => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(CouchDaoError::RequestStatus {
                path: doc_id.to_string(),
                status: other,
            }),
        }
    }

    /// PUT a document, re-reading the current revision on conflict so the
    /// write eventually lands. Used for whole-document replacements where
    /// last-write-wins is acceptable.
    async fn put_document_latest<B, D>(
        &self,
        doc_id: &str,
        build: impl Fn(Option<String>) -> D,
        current_rev: impl Fn(&B) -> Option<String>,
    ) -> CouchResult<()>
    where
        B: DeserializeOwned,
        D: Serialize,
    {
        let mut rev = self
            .get_document::<B>(doc_id)
            .await?
            .and_then(|existing| current_rev(&existing));

        for _ in 0..MAX_CAS_RETRIES {
            if self.put_document(doc_id, &build(rev.clone())).await? {
                return Ok(());
            }
            rev = self
                .get_document::<B>(doc_id)
                .await?
                .and_then(|existing| current_rev(&existing));
        }

        Err(CouchDaoError::UpdateConflict {
            doc_id: doc_id.to_string(),
        })
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{prefix}\"")),
            ("endkey", format!("\"{prefix}{END_SUFFIX}\"")),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::RequestStatus {
                path: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::DecodeResponse {
                path: ALL_DOCS.to_string(),
                source,
            }
        })?;

        let mut documents = Vec::new();
        for row in payload.rows {
            if let Some(doc) = row.doc {
                let parsed = from_value(doc).map_err(|source| CouchDaoError::DeserializeValue {
                    path: ALL_DOCS.to_string(),
                    source,
                })?;
                documents.push(parsed);
            }
        }

        Ok(documents)
    }

    /// Commit many room documents in a single `_bulk_docs` call.
    async fn bulk_save_rooms(&self, rooms: Vec<RoomEntity>) -> CouchResult<()> {
        const BULK_DOCS: &str = "_bulk_docs";

        let mut docs = Vec::with_capacity(rooms.len());
        for room in rooms {
            let doc_id = room_doc_id(&room.name);
            let rev = self
                .get_document::<CouchRoomDocument>(&doc_id)
                .await?
                .and_then(|existing| existing.rev);
            docs.push(CouchRoomDocument::from_entity(room, rev));
        }

        let response = self
            .request(Method::POST, BULK_DOCS)
            .json(&json!({ "docs": docs }))
            .send()
            .await
            .map_err(|source| CouchDaoError::RequestSend {
                path: BULK_DOCS.to_string(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::RequestStatus {
                path: BULK_DOCS.to_string(),
                status: response.status(),
            })
        }
    }

    async fn update_room_cas(
        &self,
        name: String,
        mut mutate: RoomMutation,
    ) -> CouchResult<Option<RoomUpdateOutcome>> {
        let doc_id = room_doc_id(&name);

        for _ in 0..MAX_CAS_RETRIES {
            let Some(existing) = self.get_document::<CouchRoomDocument>(&doc_id).await? else {
                return Ok(None);
            };

            let before = existing.room.clone();
            let mut after = existing.room;
            mutate(&mut after);

            let doc = CouchRoomDocument::from_entity(after.clone(), existing.rev);
            if self.put_document(&doc_id, &doc).await? {
                return Ok(Some(RoomUpdateOutcome { before, after }));
            }
            // Lost the revision race; re-read and re-apply.
        }

        Err(CouchDaoError::UpdateConflict { doc_id })
    }
}

impl RoomStore for CouchRoomStore {
    fn find_room(&self, name: String) -> BoxFuture<'static, StorageResult<Option<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = room_doc_id(&name);
            let maybe_doc = store.get_document::<CouchRoomDocument>(&doc_id).await?;
            Ok(maybe_doc.map(|doc| doc.room))
        })
    }

    fn save_room(&self, room: RoomEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = room_doc_id(&room.name);
            store
                .put_document_latest::<CouchRoomDocument, _>(
                    &doc_id,
                    |rev| CouchRoomDocument::from_entity(room.clone(), rev),
                    |existing| existing.rev.clone(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn update_room(
        &self,
        name: String,
        mutate: RoomMutation,
    ) -> BoxFuture<'static, StorageResult<Option<RoomUpdateOutcome>>> {
        let store = self.clone();
        Box::pin(async move { store.update_room_cas(name, mutate).await.map_err(Into::into) })
    }

    fn list_rooms(&self) -> BoxFuture<'static, StorageResult<Vec<RoomEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchRoomDocument>(ROOM_PREFIX)
                .await?;
            Ok(docs.into_iter().map(|doc| doc.room).collect())
        })
    }

    fn save_rooms(&self, rooms: Vec<RoomEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.bulk_save_rooms(rooms).await.map_err(Into::into) })
    }

    fn list_artists(&self) -> BoxFuture<'static, StorageResult<Vec<StoredArtistEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchArtistPoolDocument>(ARTIST_POOL_DOC_ID)
                .await?;
            Ok(maybe_doc.map(|doc| doc.artists).unwrap_or_default())
        })
    }

    fn replace_artists(
        &self,
        artists: Vec<StoredArtistEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .put_document_latest::<CouchArtistPoolDocument, _>(
                    ARTIST_POOL_DOC_ID,
                    |rev| CouchArtistPoolDocument::new(artists.clone(), rev),
                    |existing| existing.rev.clone(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_daily_challenge(
        &self,
    ) -> BoxFuture<'static, StorageResult<Option<DailyChallengeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let maybe_doc = store
                .get_document::<CouchDailyChallengeDocument>(DAILY_CHALLENGE_DOC_ID)
                .await?;
            Ok(maybe_doc.map(|doc| doc.challenge))
        })
    }

    fn save_daily_challenge(
        &self,
        challenge: DailyChallengeEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .put_document_latest::<CouchDailyChallengeDocument, _>(
                    DAILY_CHALLENGE_DOC_ID,
                    |rev| CouchDailyChallengeDocument::new(challenge.clone(), rev),
                    |existing| existing.rev.clone(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = format!("{}/{}", store.base_url, store.database);
            let mut builder = store.client.get(&url);
            if let Some((ref user, ref pass)) = store.auth {
                builder = builder.basic_auth(user.as_ref(), Some(pass.as_ref()));
            }

            let response = builder
                .send()
                .await
                .map_err(|source| CouchDaoError::RequestSend {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::RequestStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
