// Capture page: streams webcam frames as JPEG data URLs over `/ws` and shows each reply.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <title>Motion Sense</title>
</head>
<body style="font-family: sans-serif;">
    <h2>Motion Sense</h2>
    <video id="camera" autoplay playsinline muted width="640" height="480" style="border:1px solid #444"></video>
    <canvas id="grab" width="640" height="480" style="display:none"></canvas>
    <div style="margin: 8px 0;">
        <span id="movement" style="font-size: 20px;">waiting for camera</span>
        <span id="score" style="font-family: monospace; color: #777; margin-left: 12px;"></span>
    </div>
    <script>
    (function(){
        const FRAME_INTERVAL_MS = 200;
        const video = document.getElementById('camera');
        const canvas = document.getElementById('grab');
        const ctx = canvas.getContext('2d');
        const movement = document.getElementById('movement');
        const score = document.getElementById('score');
        let busy = false;

        const ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/ws');
        ws.onmessage = (ev) => {
            busy = false;
            const msg = JSON.parse(ev.data);
            movement.textContent = msg.text;
            score.textContent = 'score ' + msg.score;
        };
        ws.onclose = () => { movement.textContent = 'disconnected'; };

        navigator.mediaDevices.getUserMedia({ video: true, audio: false }).then((stream) => {
            video.srcObject = stream;
            setInterval(() => {
                if (busy || ws.readyState !== WebSocket.OPEN || video.readyState < 2) return;
                ctx.drawImage(video, 0, 0, canvas.width, canvas.height);
                busy = true;
                ws.send(JSON.stringify({ image: canvas.toDataURL('image/jpeg', 0.7) }));
            }, FRAME_INTERVAL_MS);
        }).catch((err) => { movement.textContent = 'camera unavailable: ' + err; });
    })();
    </script>
</body>
</html>
"#;
