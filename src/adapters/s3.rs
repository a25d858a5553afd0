use crate::adapters::format::format_resource_options;
use crate::adapters::Adapter;
use crate::domain::model::{Dataset, Options, RESOURCE_KEY};
use crate::domain::ports::{Backend, ObjectClient};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub const S3_KEYWORD: &str = "s3";

/// 呼叫端可指定的物件路徑前綴選項
pub const S3_PATH_OPTION: &str = "s3path";

const S3_DEPENDENCY: &str = "aws-sdk-s3";
const S3_GUIDANCE: &str =
    "the s3 adapter needs the object store client; rebuild with `cargo build --features s3` and configure AWS credentials";

/// `s3://bucket/prefix/` 形式的物件路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    pub bucket: String,
    pub prefix: String,
}

impl ObjectPath {
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|e| ImportError::InvalidConfigValueError {
            field: S3_PATH_OPTION.to_string(),
            value: uri.to_string(),
            reason: format!("Invalid object path: {}", e),
        })?;

        if url.scheme() != "s3" {
            return Err(ImportError::InvalidConfigValueError {
                field: S3_PATH_OPTION.to_string(),
                value: uri.to_string(),
                reason: format!("Unsupported scheme: {}", url.scheme()),
            });
        }

        let bucket = url
            .host_str()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ImportError::InvalidConfigValueError {
                field: S3_PATH_OPTION.to_string(),
                value: uri.to_string(),
                reason: "Object path has no bucket".to_string(),
            })?
            .to_string();

        Ok(Self {
            bucket,
            prefix: url.path().trim_start_matches('/').to_string(),
        })
    }

    /// 在前綴下組出物件鍵
    pub fn key_for(&self, name: &str) -> String {
        let name = name.trim_start_matches('/');
        if self.prefix.is_empty() {
            name.to_string()
        } else if self.prefix.ends_with('/') {
            format!("{}{}", self.prefix, name)
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

/// 遠端物件儲存後端，資料以 JSON 編碼的 [`Dataset`] 存放
#[derive(Clone)]
pub struct S3Backend {
    client: Option<Arc<dyn ObjectClient>>,
    default_path: Option<String>,
}

impl S3Backend {
    pub fn new(client: Option<Arc<dyn ObjectClient>>, default_path: Option<String>) -> Self {
        Self {
            client,
            default_path,
        }
    }

    fn client(&self) -> Result<&Arc<dyn ObjectClient>> {
        self.client.as_ref().ok_or_else(|| ImportError::MissingDependency {
            dependency: S3_DEPENDENCY.to_string(),
            guidance: S3_GUIDANCE.to_string(),
        })
    }

    fn locate(&self, options: &Options) -> Result<(ObjectPath, String)> {
        let name = options
            .get(RESOURCE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ImportError::MissingResource {
                keyword: S3_KEYWORD.to_string(),
            })?;

        let path = match options.get(S3_PATH_OPTION).and_then(Value::as_str) {
            Some(path) => path,
            None => self
                .default_path
                .as_deref()
                .ok_or_else(|| ImportError::ConfigError {
                    message: format!(
                        "No object path: pass the `{}` option or set [s3].path",
                        S3_PATH_OPTION
                    ),
                })?,
        };

        let path = ObjectPath::parse(path)?;
        let key = path.key_for(name);
        Ok((path, key))
    }
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("client", &self.client.is_some())
            .field("default_path", &self.default_path)
            .finish()
    }
}

#[async_trait]
impl Backend for S3Backend {
    async fn read(&self, options: &Options) -> Result<Dataset> {
        let client = self.client()?;
        let (path, key) = self.locate(options)?;
        tracing::debug!("Fetching s3://{}/{}", path.bucket, key);

        let body = client.get_object(&path.bucket, &key).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn write(&self, dataset: &Dataset, options: &Options) -> Result<()> {
        let client = self.client()?;
        let (path, key) = self.locate(options)?;
        tracing::debug!("Storing s3://{}/{}", path.bucket, key);

        let body = serde_json::to_vec(dataset)?;
        client.put_object(&path.bucket, &key, body).await
    }
}

pub fn s3_adapter(client: Option<Arc<dyn ObjectClient>>, default_path: Option<String>) -> Adapter {
    Adapter::new(S3Backend::new(client, default_path))
        .with_keyword(S3_KEYWORD)
        .with_formatter(format_resource_options)
}

/// 依編譯功能取得預設的物件儲存客戶端
#[cfg(feature = "s3")]
pub async fn default_object_client(region: Option<String>) -> Option<Arc<dyn ObjectClient>> {
    Some(Arc::new(AwsObjectClient::from_env(region).await))
}

#[cfg(not(feature = "s3"))]
pub async fn default_object_client(_region: Option<String>) -> Option<Arc<dyn ObjectClient>> {
    tracing::debug!("Built without the s3 feature, object store client unavailable");
    None
}

#[cfg(feature = "s3")]
pub use aws::AwsObjectClient;

#[cfg(feature = "s3")]
mod aws {
    use super::*;
    use aws_config::BehaviorVersion;
    use aws_sdk_s3::config::Region;
    use aws_sdk_s3::Client as S3Client;

    #[derive(Debug, Clone)]
    pub struct AwsObjectClient {
        client: S3Client,
    }

    impl AwsObjectClient {
        pub fn new(client: S3Client) -> Self {
            Self { client }
        }

        pub async fn from_env(region: Option<String>) -> Self {
            let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
            let mut builder = aws_sdk_s3::config::Builder::from(&config).force_path_style(true);
            if let Some(region) = region {
                builder = builder.region(Region::new(region));
            }
            Self::new(S3Client::from_conf(builder.build()))
        }
    }

    #[async_trait]
    impl ObjectClient for AwsObjectClient {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            let resp = self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| ImportError::ObjectStore {
                    message: format!("Failed to read s3://{}/{}: {}", bucket, key, e),
                })?;

            let data = resp.body.collect().await.map_err(|e| ImportError::ObjectStore {
                message: format!("Failed to collect s3://{}/{}: {}", bucket, key, e),
            })?;

            Ok(data.into_bytes().to_vec())
        }

        async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(body.into())
                .send()
                .await
                .map_err(|e| ImportError::ObjectStore {
                    message: format!("Failed to write s3://{}/{}: {}", bucket, key, e),
                })?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{options_from_value, Column, ColumnType};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MockObjectClient {
        objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    }

    #[async_trait]
    impl ObjectClient for MockObjectClient {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            let objects = self.objects.lock().await;
            objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| ImportError::ObjectStore {
                    message: format!("NoSuchKey: {}", key),
                })
        }

        async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
            let mut objects = self.objects.lock().await;
            objects.insert((bucket.to_string(), key.to_string()), body);
            Ok(())
        }
    }

    fn sample() -> Dataset {
        Dataset::from_columns(vec![Column::new(
            "y",
            ColumnType::Numeric,
            vec![json!(0.5), json!(1.5)],
        )])
        .unwrap()
    }

    #[test]
    fn test_object_path_parse() {
        let path = ObjectPath::parse("s3://models/churn/data").unwrap();
        assert_eq!(path.bucket, "models");
        assert_eq!(path.prefix, "churn/data");
        assert_eq!(path.key_for("train"), "churn/data/train");

        let root = ObjectPath::parse("s3://models").unwrap();
        assert_eq!(root.key_for("train"), "train");

        assert!(ObjectPath::parse("https://example.com/x").is_err());
        assert!(ObjectPath::parse("not a uri").is_err());
    }

    #[tokio::test]
    async fn test_missing_client_reports_dependency() {
        let adapter = s3_adapter(None, Some("s3://bucket/".to_string()));

        let err = adapter.read("train").await.unwrap_err();
        match err {
            ImportError::MissingDependency { dependency, guidance } => {
                assert_eq!(dependency, "aws-sdk-s3");
                assert!(guidance.contains("--features s3"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_under_prefix() {
        let client = Arc::new(MockObjectClient::default());
        let adapter = s3_adapter(Some(client.clone()), Some("s3://bucket/default/".to_string()));

        adapter
            .write(&sample(), json!({"resource": "train", "s3path": "s3://bucket/custom"}))
            .await
            .unwrap();

        assert!(client
            .objects
            .lock()
            .await
            .contains_key(&("bucket".to_string(), "custom/train".to_string())));

        let loaded = adapter
            .read(json!({"name": "train", "s3path": "s3://bucket/custom"}))
            .await
            .unwrap();
        assert_eq!(loaded, sample());

        // 預設路徑下沒有這個物件
        assert!(adapter.read("train").await.is_err());
    }

    #[tokio::test]
    async fn test_ragged_payload_is_rejected() {
        let client = Arc::new(MockObjectClient::default());
        let payload = json!({"columns": [
            {"name": "a", "kind": "integer", "values": [1, 2]},
            {"name": "b", "kind": "character", "values": ["x"]}
        ]});
        client.objects.lock().await.insert(
            ("bucket".to_string(), "ragged".to_string()),
            serde_json::to_vec(&payload).unwrap(),
        );
        let adapter = s3_adapter(Some(client), Some("s3://bucket/".to_string()));

        let result = adapter.read("ragged").await;

        assert!(matches!(result, Err(ImportError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_no_path_is_config_error() {
        let client: Arc<dyn ObjectClient> = Arc::new(MockObjectClient::default());
        let backend = S3Backend::new(Some(client), None);

        let result = backend
            .read(&options_from_value(json!({"resource": "train"})))
            .await;
        assert!(matches!(result, Err(ImportError::ConfigError { .. })));
    }
}
