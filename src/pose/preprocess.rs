use anyhow::Result;
use ndarray::Array4;
use opencv::{
    core::{Mat, Size, CV_32FC3},
    imgproc,
    prelude::*,
};

/// OpenCV Mat を姿勢推定モデルの入力テンソルに変換
///
/// - BGR -> RGB
/// - input_size x input_size にリサイズ
/// - [0, 255] -> [0.0, 1.0] 正規化
/// - NCHW [1, 3, input_size, input_size] の f32 テンソル
pub fn preprocess_frame(frame: &Mat, input_size: i32) -> Result<Array4<f32>> {
    // BGR -> RGB
    let mut rgb = Mat::default();
    imgproc::cvt_color_def(frame, &mut rgb, imgproc::COLOR_BGR2RGB)?;

    // input_size x input_size にリサイズ
    let mut resized = Mat::default();
    imgproc::resize(
        &rgb,
        &mut resized,
        Size::new(input_size, input_size),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    // f32 に変換
    let mut float_mat = Mat::default();
    resized.convert_to(&mut float_mat, CV_32FC3, 1.0, 0.0)?;

    // NCHW [1, 3, size, size] に詰め替え
    let s = input_size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, s, s));
    let data = float_mat.data_bytes()?;
    let step = float_mat.mat_step().get(0);
    for y in 0..s {
        let row_ptr = unsafe {
            std::slice::from_raw_parts(data.as_ptr().add(y * step) as *const f32, s * 3)
        };
        for x in 0..s {
            for c in 0..3 {
                tensor[[0, c, y, x]] = row_ptr[x * 3 + c] / 255.0;
            }
        }
    }

    Ok(tensor)
}
