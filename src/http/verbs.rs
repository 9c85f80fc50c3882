use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::client::HttpClient;
use super::options::RequestOptions;
use crate::error::HttpError;

// 常用方法封装
impl HttpClient {
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, HttpError> {
        self.dispatch(endpoint, options).await
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, HttpError> {
        self.dispatch(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T>(&self, endpoint: &str, data: &T) -> Result<Value, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::POST).with_json(data)?;
        self.dispatch(endpoint, options).await
    }

    pub async fn put<T>(&self, endpoint: &str, data: &T) -> Result<Value, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let options = RequestOptions::new(Method::PUT).with_json(data)?;
        self.dispatch(endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value, HttpError> {
        self.dispatch(endpoint, RequestOptions::new(Method::DELETE)).await
    }

    pub async fn get_as<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, HttpError> {
        decode(self.get(endpoint).await?)
    }

    pub async fn post_as<T, R>(&self, endpoint: &str, data: &T) -> Result<R, HttpError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        decode(self.post(endpoint, data).await?)
    }

    pub async fn put_as<T, R>(&self, endpoint: &str, data: &T) -> Result<R, HttpError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        decode(self.put(endpoint, data).await?)
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, HttpError> {
    serde_json::from_value(value).map_err(HttpError::from)
}
